use crate::debug::DebugPath;
use crate::error::Result;
use crate::map::{TileId, VOID};
use crate::ray::{Axis, RayHit, Raycaster};
use crate::scene::Scene;
use crate::viewport::{grid_to_pixel, Viewport};
use glam::DVec2;
use std::collections::HashMap;
use std::fmt;

/// Half the height of a wall in world units.
pub const WALL_HALF_HEIGHT: f64 = 64.;

pub const PLAYER_RADIUS: f64 = 16.;
pub const TRACE_RADIUS: f64 = 4.;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const RED: Self = Self::rgb(0xff, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `factor`, saturating at the channel bounds.
    pub fn shade(self, factor: f64) -> Self {
        let scale = |c: u8| (c as f64 * factor).round().clamp(0., 255.) as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors for tiles and for everything drawn around them.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    tiles: HashMap<TileId, Color>,
    pub ceiling: Color,
    pub floor: Color,
    pub player: Color,
    pub trace: Color,
    pub outline: Color,
    /// Color of the synthetic wall around the grid.
    pub void: Color,
    /// Multiplier applied to walls struck on an `Axis::Y` line. 1.0 leaves them untouched.
    pub side_shade: f64,
}

impl Default for Palette {
    fn default() -> Self {
        let tiles = [
            (0, Color::rgb(0xf0, 0xf8, 0xff)), // AliceBlue
            (1, Color::rgb(0x00, 0x8b, 0x8b)), // Cyan4
            (2, Color::rgb(0x8b, 0x00, 0x00)), // DarkRed
            (3, Color::rgb(0x2f, 0x4f, 0x4f)), // DarkSlateGrey
            (4, Color::rgb(0x83, 0x8b, 0x8b)), // azure4
        ];

        Self {
            tiles: tiles.into_iter().collect(),
            ceiling: Color::rgb(0x2f, 0x4f, 0x4f),
            floor: Color::rgb(0x83, 0x8b, 0x8b),
            player: Color::RED,
            trace: Color::BLACK,
            outline: Color::BLACK,
            void: Color::BLACK,
            side_shade: 1.,
        }
    }
}

impl Palette {
    pub fn tile(&self, id: TileId) -> Option<Color> {
        if id == VOID {
            return Some(self.void);
        }
        self.tiles.get(&id).copied()
    }

    pub fn set_tile(&mut self, id: TileId, color: Color) {
        self.tiles.insert(id, color);
    }

    /// Color of a wall slice for `hit`.
    pub fn wall(&self, hit: &RayHit) -> Color {
        let color = self.tile(hit.tile).unwrap_or(self.void);
        match hit.axis {
            Axis::X => color,
            Axis::Y => color.shade(self.side_shade),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Rect {
        top_left: DVec2,
        bottom_right: DVec2,
        color: Color,
        filled: bool,
    },
    Circle {
        center: DVec2,
        radius: f64,
        color: Color,
    },
    Line {
        from: DVec2,
        to: DVec2,
        color: Color,
    },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rect {
                top_left,
                bottom_right,
                color,
                filled,
            } => write!(
                f,
                "rect {:.2},{:.2} {:.2},{:.2} {color}{}",
                top_left.x,
                top_left.y,
                bottom_right.x,
                bottom_right.y,
                if *filled { " filled" } else { "" }
            ),
            Self::Circle {
                center,
                radius,
                color,
            } => write!(f, "circle {:.2},{:.2} r{radius} {color}", center.x, center.y),
            Self::Line { from, to, color } => write!(
                f,
                "line {:.2},{:.2} {:.2},{:.2} {color}",
                from.x, from.y, to.x, to.y
            ),
        }
    }
}

/// Vertical extent of a wall column in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSlice {
    pub top: f64,
    pub bottom: f64,
}

/// Project a hit at `depth` into `view`. Both ends saturate inward at the view bounds.
pub fn wall_slice(view: &Viewport, depth: f64) -> WallSlice {
    let (top, bottom, center) = (view.top, view.bottom(), view.center_y());

    let wall_top = top.min((center + WALL_HALF_HEIGHT) / depth).max(bottom);
    let wall_bottom = bottom.max((center - WALL_HALF_HEIGHT) / depth).min(top);

    WallSlice {
        top: wall_top,
        bottom: wall_bottom,
    }
}

/// One rendered pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    /// One hit per first-person column, left to right.
    pub hits: Vec<RayHit>,
}

/// Turns a validated [`Scene`] into draw commands.
pub struct Renderer {
    scene: Scene,
}

impl Renderer {
    pub fn new(scene: Scene) -> Result<Self> {
        scene.validate()?;
        Ok(Self { scene })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn raycaster(&self) -> Raycaster<'_> {
        Raycaster::new(&self.scene.grid, self.scene.max_steps)
    }

    /// Number of first-person columns, one per pixel of the view width.
    pub fn columns(&self) -> usize {
        self.scene.viewports.view.width as usize
    }

    pub fn cast_columns(&self) -> Vec<RayHit> {
        self.raycaster()
            .cast_columns(&self.scene.pose, self.columns())
    }

    /// Draw the whole frame: panel outlines, the top-down map, the debug ray, then the
    /// first-person view.
    pub fn render(&self) -> Vec<DrawCommand> {
        self.render_frame().commands
    }

    /// Like [`Renderer::render`], also handing back the column hits the view was drawn from.
    pub fn render_frame(&self) -> Frame {
        let mut commands = Vec::new();

        self.draw_outlines(&mut commands);
        self.draw_map(&mut commands);
        DebugPath::trace(&self.raycaster(), &self.scene.pose).draw(&self.scene, &mut commands);
        let hits = self.cast_columns();
        self.draw_view(&hits, &mut commands);

        log::debug!("rendered {} draw commands", commands.len());
        Frame { commands, hits }
    }

    fn draw_outlines(&self, out: &mut Vec<DrawCommand>) {
        let viewports = &self.scene.viewports;
        for vp in [viewports.title, viewports.map, viewports.view] {
            out.push(DrawCommand::Rect {
                top_left: vp.top_left(),
                bottom_right: vp.bottom_right(),
                color: self.scene.palette.outline,
                filled: false,
            });
        }
    }

    fn draw_map(&self, out: &mut Vec<DrawCommand>) {
        let Scene {
            grid,
            pose,
            viewports,
            palette,
            ..
        } = &self.scene;
        let dims = (grid.rows(), grid.cols());

        for (cell, tile) in grid.cells() {
            let (row, col) = (cell.row as f64, cell.col as f64);
            out.push(DrawCommand::Rect {
                top_left: grid_to_pixel(&viewports.map, dims, row, col),
                bottom_right: grid_to_pixel(&viewports.map, dims, row + 1., col + 1.),
                color: palette.tile(tile).unwrap_or(palette.void),
                filled: true,
            });
        }

        out.push(DrawCommand::Circle {
            center: grid_to_pixel(&viewports.map, dims, pose.row(), pose.col()),
            radius: PLAYER_RADIUS,
            color: palette.player,
        });
    }

    fn draw_view(&self, hits: &[RayHit], out: &mut Vec<DrawCommand>) {
        let view = &self.scene.viewports.view;
        let palette = &self.scene.palette;
        let (top, bottom) = (view.top, view.bottom());

        for (i, hit) in hits.iter().enumerate() {
            let x = view.left + i as f64;
            let slice = wall_slice(view, hit.distance);
            let segment = |from: f64, to: f64, color: Color| DrawCommand::Line {
                from: DVec2::new(x, from),
                to: DVec2::new(x, to),
                color,
            };

            out.push(segment(top, slice.top, palette.ceiling));
            out.push(segment(slice.top, slice.bottom, palette.wall(hit)));
            out.push(segment(slice.bottom, bottom, palette.floor));
        }
    }
}
