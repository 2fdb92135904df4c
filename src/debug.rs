//! Step-by-step trace of the forward ray, drawn over the top-down map to check the DDA walk
//! by eye.

use crate::ray::{Pose, RayHit, Raycaster};
use crate::render::{DrawCommand, TRACE_RADIUS};
use crate::scene::Scene;
use crate::viewport::grid_to_pixel;
use glam::DVec2;

#[derive(Clone, Debug, PartialEq)]
pub struct DebugPath {
    pub origin: DVec2,
    /// Grid-space point of every grid line crossing, in order, including the final one.
    pub crossings: Vec<DVec2>,
    /// `None` if the walk timed out before reaching a wall.
    pub hit: Option<RayHit>,
}

impl DebugPath {
    /// Walk the undeflected forward ray of `pose`.
    pub fn trace(caster: &Raycaster<'_>, pose: &Pose) -> Self {
        let origin = pose.position;
        let dir = pose.forward();
        let mut crossings = Vec::new();
        let mut hit = None;

        for crossing in caster.walk(origin, dir) {
            match crossing {
                Ok(crossing) => {
                    crossings.push(origin + dir * crossing.distance);
                    if crossing.is_hit() {
                        hit = Some(crossing.into());
                    }
                }
                Err(err) => log::warn!("debug ray: {err}"),
            }
        }

        Self {
            origin,
            crossings,
            hit,
        }
    }

    /// Grid-space point where the ray struck its wall, which is also the last crossing.
    pub fn end(&self) -> Option<DVec2> {
        self.hit.and(self.crossings.last().copied())
    }

    /// Dots at every crossing and a line from the origin to the hit, in the map panel.
    pub fn draw(&self, scene: &Scene, out: &mut Vec<DrawCommand>) {
        let map = &scene.viewports.map;
        let dims = (scene.grid.rows(), scene.grid.cols());
        let to_pixel = |p: DVec2| grid_to_pixel(map, dims, p.y, p.x);

        out.extend(self.crossings.iter().map(|&p| DrawCommand::Circle {
            center: to_pixel(p),
            radius: TRACE_RADIUS,
            color: scene.palette.trace,
        }));

        if let Some(end) = self.end() {
            out.push(DrawCommand::Line {
                from: to_pixel(self.origin),
                to: to_pixel(end),
                color: scene.palette.trace,
            });
        }
    }
}
