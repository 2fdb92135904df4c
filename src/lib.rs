//! Grid raycaster: renders a first-person view of a tile map next to a top-down panel, as a
//! list of draw commands that any backend can present.

pub mod debug;
pub mod error;
pub mod map;
pub mod ray;
pub mod render;
pub mod scene;
pub mod viewport;

pub use error::RenderError;
pub use map::{Cell, TileGrid, TileId};
pub use ray::{Axis, Pose, RayHit, Raycaster};
pub use render::{Color, DrawCommand, Frame, Palette, Renderer};
pub use scene::{Scene, Viewports};
pub use viewport::{grid_to_pixel, Viewport};

/// Validate `scene` and render one frame.
pub fn render(scene: Scene) -> error::Result<Vec<DrawCommand>> {
    Ok(Renderer::new(scene)?.render())
}
