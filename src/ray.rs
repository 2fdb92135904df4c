use crate::error::{RenderError, Result};
use crate::map::{is_wall, Cell, TileGrid, TileId, VOID};
use glam::{DVec2, IVec2};

/// Delta distance used for an axis the ray never moves along. Larger than any traversal
/// a grid can need, so that axis never wins the comparison.
pub const SENTINEL_LARGE: f64 = 1e30;

/// Distance reported for a ray that ran out of steps.
pub const MAX_DEPTH: f64 = 1e30;

pub const DEFAULT_MAX_STEPS: usize = 4096;

/// Which family of grid lines a ray crossed: `X` lines separate columns, `Y` lines separate
/// rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Player position in grid space (x = column, y = row) and facing in degrees.
/// 0° looks along +column, angles grow counter-clockwise on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: DVec2,
    pub angle: f64,
}

impl Pose {
    pub fn new(row: f64, col: f64, angle: f64) -> Self {
        Self {
            position: DVec2::new(col, row),
            angle,
        }
    }

    pub fn row(&self) -> f64 {
        self.position.y
    }

    pub fn col(&self) -> f64 {
        self.position.x
    }

    /// Unit vector the player is looking along. Rows grow downward on screen, hence the
    /// flipped y.
    pub fn forward(&self) -> DVec2 {
        let v = DVec2::from_angle(self.angle.to_radians());
        DVec2::new(v.x, -v.y)
    }
}

/// One grid line crossing of a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    /// Cell the ray entered.
    pub cell: Cell,
    pub axis: Axis,
    /// Ray parameter at the crossing, in units of the (unnormalized) direction vector.
    pub distance: f64,
    /// Tile of `cell`, or [`VOID`] when the cell lies outside the grid.
    pub tile: TileId,
}

impl Crossing {
    pub fn is_hit(&self) -> bool {
        is_wall(self.tile)
    }
}

/// Result of casting one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    /// Never [`crate::map::EMPTY`].
    pub tile: TileId,
    pub axis: Axis,
    pub cell: Cell,
}

impl RayHit {
    /// Stand-in for a ray that timed out in `cell` after last crossing an `axis` line.
    pub fn max_depth(cell: Cell, axis: Axis) -> Self {
        Self {
            distance: MAX_DEPTH,
            tile: VOID,
            axis,
            cell,
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.tile == VOID
    }
}

impl From<Crossing> for RayHit {
    fn from(crossing: Crossing) -> Self {
        Self {
            distance: crossing.distance,
            tile: crossing.tile,
            axis: crossing.axis,
            cell: crossing.cell,
        }
    }
}

fn delta_dist(d: f64) -> f64 {
    if d == 0. {
        SENTINEL_LARGE
    } else {
        1. / d.abs()
    }
}

/// Step direction and distance to the first grid line along one axis.
fn axis_start(origin: f64, cell: i32, d: f64, delta: f64) -> (i32, f64) {
    if d < 0. {
        (-1, (origin - cell as f64) * delta)
    } else {
        (1, (cell as f64 + 1. - origin) * delta)
    }
}

/// Grid traversal of a single ray, yielding every grid line crossing up to and including
/// the first wall. Leaving the grid counts as hitting a [`VOID`] wall, so the walk always
/// ends; if it takes more than `max_steps` crossings a [`RenderError::RayTimeout`] is
/// yielded instead.
pub struct DdaWalk<'g> {
    grid: &'g TileGrid,
    delta: DVec2,
    side: DVec2,
    step: IVec2,
    // x is the column, y the row
    cell: IVec2,
    steps: usize,
    max_steps: usize,
    finished: bool,
}

impl<'g> DdaWalk<'g> {
    pub fn new(grid: &'g TileGrid, origin: DVec2, dir: DVec2, max_steps: usize) -> Self {
        let delta = DVec2::new(delta_dist(dir.x), delta_dist(dir.y));
        let cell = origin.floor().as_ivec2();
        let (step_x, side_x) = axis_start(origin.x, cell.x, dir.x, delta.x);
        let (step_y, side_y) = axis_start(origin.y, cell.y, dir.y, delta.y);

        Self {
            grid,
            delta,
            side: DVec2::new(side_x, side_y),
            step: IVec2::new(step_x, step_y),
            cell,
            steps: 0,
            max_steps,
            finished: false,
        }
    }

    /// Cell the walk currently sits in.
    pub fn cell(&self) -> Cell {
        Cell::new(self.cell.y, self.cell.x)
    }
}

impl Iterator for DdaWalk<'_> {
    type Item = Result<Crossing>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.steps >= self.max_steps {
            self.finished = true;
            return Some(Err(RenderError::RayTimeout { steps: self.steps }));
        }
        self.steps += 1;

        // ties go to the Y branch
        let (axis, distance) = if self.side.x < self.side.y {
            self.cell.x += self.step.x;
            self.side.x += self.delta.x;
            (Axis::X, self.side.x - self.delta.x)
        } else {
            self.cell.y += self.step.y;
            self.side.y += self.delta.y;
            (Axis::Y, self.side.y - self.delta.y)
        };

        let cell = self.cell();
        let tile = if self.grid.contains(cell) {
            self.grid.tile(cell.row as usize, cell.col as usize)
        } else {
            VOID
        };
        self.finished = is_wall(tile);
        log::trace!("step {}: {axis:?} into {cell:?} at {distance}, tile {tile}", self.steps);

        Some(Ok(Crossing {
            cell,
            axis,
            distance,
            tile,
        }))
    }
}

/// Direction of the ray for screen column `i` of `width`, fanned around `forward` along
/// its perpendicular. The offset runs from -1 at the left edge towards 1 at the right.
pub fn column_direction(forward: DVec2, i: usize, width: usize) -> DVec2 {
    let t = i as f64 / (width as f64 / 2.) - 1.;
    forward + forward.perp() * t
}

pub struct Raycaster<'g> {
    grid: &'g TileGrid,
    max_steps: usize,
}

impl<'g> Raycaster<'g> {
    pub fn new(grid: &'g TileGrid, max_steps: usize) -> Self {
        Self { grid, max_steps }
    }

    pub fn walk(&self, origin: DVec2, dir: DVec2) -> DdaWalk<'g> {
        DdaWalk::new(self.grid, origin, dir, self.max_steps)
    }

    /// Cast a single ray from `origin` along `dir`. The reported distance is the ray
    /// parameter along `dir` itself, with no projection onto the view plane.
    pub fn cast(&self, origin: DVec2, dir: DVec2) -> Result<RayHit> {
        for crossing in self.walk(origin, dir) {
            let crossing = crossing?;
            if crossing.is_hit() {
                return Ok(crossing.into());
            }
        }
        // a walk only stops on a hit or a timeout
        Err(RenderError::RayTimeout {
            steps: self.max_steps,
        })
    }

    /// Like [`Raycaster::cast`], but a ray that times out becomes a [`RayHit::max_depth`]
    /// in the last cell it reached, keeping the axis of its last crossing (Y if it never
    /// crossed anything).
    pub fn cast_or_max_depth(&self, origin: DVec2, dir: DVec2) -> RayHit {
        let mut walk = self.walk(origin, dir);
        let mut last_axis = None;

        for crossing in walk.by_ref() {
            match crossing {
                Ok(crossing) if crossing.is_hit() => return crossing.into(),
                Ok(crossing) => last_axis = Some(crossing.axis),
                Err(err) => {
                    log::warn!("ray from {origin} along {dir}: {err}");
                    break;
                }
            }
        }

        RayHit::max_depth(walk.cell(), last_axis.unwrap_or(Axis::Y))
    }

    /// One hit per screen column. A ray that times out is replaced with
    /// [`RayHit::max_depth`] and the remaining columns are still cast.
    pub fn cast_columns(&self, pose: &Pose, width: usize) -> Vec<RayHit> {
        let forward = pose.forward();

        (0..width)
            .map(|i| self.cast_or_max_depth(pose.position, column_direction(forward, i, width)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room() -> TileGrid {
        TileGrid::new(vec![vec![0; 4]; 4]).unwrap()
    }

    #[test]
    fn forward_vector() {
        let east = Pose::new(1., 1., 0.).forward();
        assert!((east - DVec2::X).length() < 1e-12);
        // 90° looks up the screen, toward smaller rows
        let north = Pose::new(1., 1., 90.).forward();
        assert!((north - DVec2::NEG_Y).length() < 1e-12);
    }

    #[test]
    fn column_fan_spans_offsets() {
        let forward = DVec2::X;
        assert_eq!(column_direction(forward, 0, 10), DVec2::new(1., -1.));
        assert_eq!(column_direction(forward, 5, 10), DVec2::new(1., 0.));
    }

    #[test]
    fn walk_leaves_open_room_through_void() {
        let grid = open_room();
        let crossings = DdaWalk::new(&grid, DVec2::new(1.5, 1.5), DVec2::X, 64)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(crossings.len(), 3);
        let last = crossings.last().unwrap();
        assert_eq!(last.tile, VOID);
        assert_eq!(last.cell, Cell::new(1, 4));
        assert_eq!(last.axis, Axis::X);
        assert!((last.distance - 2.5).abs() < 1e-12);
    }

    #[test]
    fn walk_times_out() {
        let grid = open_room();
        let mut walk = DdaWalk::new(&grid, DVec2::new(0.5, 0.5), DVec2::new(1., 1.), 2);
        assert!(walk.next().unwrap().is_ok());
        assert!(walk.next().unwrap().is_ok());
        assert_eq!(walk.next(), Some(Err(RenderError::RayTimeout { steps: 2 })));
        assert_eq!(walk.next(), None);
    }

    #[test]
    fn timed_out_columns_use_max_depth() {
        let grid = open_room();
        let caster = Raycaster::new(&grid, 1);
        let hits = caster.cast_columns(&Pose::new(1.5, 1.5, 0.), 4);
        // the leftmost ray ties through a corner and crosses a row line first, the others
        // cross a column line
        assert_eq!(
            hits,
            vec![
                RayHit::max_depth(Cell::new(0, 1), Axis::Y),
                RayHit::max_depth(Cell::new(1, 2), Axis::X),
                RayHit::max_depth(Cell::new(1, 2), Axis::X),
                RayHit::max_depth(Cell::new(1, 2), Axis::X),
            ]
        );
    }

    #[test]
    fn max_depth_without_crossings_defaults_to_rows() {
        let grid = open_room();
        let caster = Raycaster::new(&grid, 0);
        let hit = caster.cast_or_max_depth(DVec2::new(2.5, 1.5), DVec2::X);
        assert_eq!(hit, RayHit::max_depth(Cell::new(1, 2), Axis::Y));
        assert_eq!(hit.distance, MAX_DEPTH);
    }
}
