use crate::error::{RenderError, Result};

pub type TileId = u8;

/// Walkable floor.
pub const EMPTY: TileId = 0;

/// Reserved id reported when a ray leaves the grid. Scene files can't place it since tiles
/// are single digits.
pub const VOID: TileId = TileId::MAX;

pub fn is_wall(id: TileId) -> bool {
    id != EMPTY
}

/// A grid cell, possibly outside the map when it comes from a boundary hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Immutable rectangular map of tile ids, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    tiles: Vec<TileId>,
}

impl TileGrid {
    pub fn new(rows: Vec<Vec<TileId>>) -> Result<Self> {
        let cols = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| RenderError::config("grid has no rows"))?;
        if cols == 0 {
            return Err(RenderError::config("grid rows are empty"));
        }

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(RenderError::config(format!(
                "row {idx} has {} tiles, expected {cols}",
                row.len()
            )));
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.rows as i32).contains(&cell.row) && (0..self.cols as i32).contains(&cell.col)
    }

    /// Tile at `(row, col)`. Panics outside the grid; use [`TileGrid::get_checked`] when the
    /// cell isn't known to be inside.
    pub fn tile(&self, row: usize, col: usize) -> TileId {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) outside grid");
        self.tiles[row * self.cols + col]
    }

    pub fn get_checked(&self, cell: Cell) -> Result<TileId> {
        if !self.contains(cell) {
            return Err(RenderError::OutOfBounds {
                row: cell.row,
                col: cell.col,
            });
        }
        Ok(self.tile(cell.row as usize, cell.col as usize))
    }

    /// Every cell with its tile, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, TileId)> + '_ {
        self.tiles.iter().enumerate().map(|(idx, &tile)| {
            let col = idx % self.cols;
            let row = (idx - col) / self.cols;
            (Cell::new(row as i32, col as i32), tile)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TileGrid::new(vec![vec![1, 1], vec![1]]).unwrap_err();
        assert!(matches!(err, RenderError::Configuration(_)));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(TileGrid::new(vec![]).is_err());
        assert!(TileGrid::new(vec![vec![], vec![]]).is_err());
    }

    #[test]
    fn checked_lookup() {
        let grid = TileGrid::new(vec![vec![1, 2, 3], vec![4, 0, 6]]).unwrap();
        assert_eq!(grid.get_checked(Cell::new(1, 2)), Ok(6));
        assert_eq!(grid.get_checked(Cell::new(1, 1)), Ok(EMPTY));
        assert_eq!(
            grid.get_checked(Cell::new(-1, 0)),
            Err(RenderError::OutOfBounds { row: -1, col: 0 })
        );
        assert!(grid.get_checked(Cell::new(0, 3)).is_err());
    }

    #[test]
    fn cells_are_row_major() {
        let grid = TileGrid::new(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let cells = grid.cells().collect::<Vec<_>>();
        assert_eq!(cells[1], (Cell::new(0, 1), 2));
        assert_eq!(cells[2], (Cell::new(1, 0), 3));
    }
}
