use serde::{Deserialize, Serialize};

use super::Position;

pub const DEFAULT_GRID_WIDTH: f32 = 400.0;
pub const DEFAULT_GRID_HEIGHT: f32 = 400.0;
pub const DEFAULT_ROWS: u32 = 4;
/// Horizontal distance from the playhead inside which a block is crossed.
pub const TRIGGER_WINDOW: f32 = 10.0;
/// Fraction of a row's height a block may sit off-center and still count as on the row.
pub const ROW_TOLERANCE: f32 = 0.25;

/// Dimensions of the grid and the tolerances used to decide what the playhead hits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    pub width: f32,
    pub height: f32,
    pub rows: u32,
    pub trigger_window: f32,
    pub row_tolerance: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            rows: DEFAULT_ROWS,
            trigger_window: TRIGGER_WINDOW,
            row_tolerance: ROW_TOLERANCE,
        }
    }
}

impl GridGeometry {
    pub fn row_height(&self) -> f32 {
        self.height / self.rows as f32
    }

    pub fn row_center(&self, row: u32) -> f32 {
        let row_height = self.row_height();
        row as f32 * row_height + row_height / 2.0
    }

    pub fn row_centers(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.rows).map(|row| self.row_center(row))
    }

    /// Vertical center of the row containing `y`, clamped so the result is
    /// always one of the row centers.
    pub fn snap_to_row(&self, y: f32) -> f32 {
        let row_height = self.row_height();
        let half_row = row_height / 2.0;
        let last_row = self.rows.saturating_sub(1) as f32;
        let row = (y / row_height).floor().clamp(0.0, last_row);
        (row * row_height + half_row).clamp(half_row, self.height - half_row)
    }

    pub fn is_on_row(&self, y: f32) -> bool {
        let tolerance = self.row_height() * self.row_tolerance;
        self.row_centers().any(|center| (y - center).abs() < tolerance)
    }

    /// Whether a block at `block_x` is inside the trigger window around `playhead`.
    pub fn within_window(&self, playhead: f32, block_x: f32) -> bool {
        (playhead - block_x).abs() < self.trigger_window
    }

    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(0.0, self.width),
            y: position.y.clamp(0.0, self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_lands_on_a_row_center() {
        let grid = GridGeometry::default();
        let centers: Vec<f32> = grid.row_centers().collect();
        assert_eq!(centers, vec![50.0, 150.0, 250.0, 350.0]);

        let mut y = 0.0;
        while y <= grid.height {
            assert!(centers.contains(&grid.snap_to_row(y)), "y = {}", y);
            y += 0.5;
        }
    }

    #[test]
    fn test_snap_is_idempotent() {
        let grid = GridGeometry::default();
        let mut y = 0.0;
        while y <= grid.height {
            let once = grid.snap_to_row(y);
            assert_eq!(grid.snap_to_row(once), once);
            y += 0.25;
        }
    }

    #[test]
    fn test_snap_picks_the_containing_row() {
        let grid = GridGeometry::default();
        assert_eq!(grid.snap_to_row(0.0), 50.0);
        assert_eq!(grid.snap_to_row(60.0), 50.0);
        assert_eq!(grid.snap_to_row(99.9), 50.0);
        assert_eq!(grid.snap_to_row(100.0), 150.0);
        assert_eq!(grid.snap_to_row(399.0), 350.0);
        assert_eq!(grid.snap_to_row(400.0), 350.0);
    }

    #[test]
    fn test_snap_with_other_heights() {
        let grid = GridGeometry {
            height: 300.0,
            ..Default::default()
        };
        assert_eq!(grid.snap_to_row(10.0), 37.5);
        assert_eq!(grid.snap_to_row(299.0), 262.5);
    }

    #[test]
    fn test_row_tolerance_edges() {
        let grid = GridGeometry::default();
        assert!(grid.is_on_row(50.0));
        assert!(grid.is_on_row(74.9));
        assert!(!grid.is_on_row(75.0));
        assert!(!grid.is_on_row(25.0));
        assert!(grid.is_on_row(325.5));
        assert!(!grid.is_on_row(400.0));
    }

    #[test]
    fn test_trigger_window_edges() {
        let grid = GridGeometry::default();
        assert!(grid.within_window(28.0, 28.0));
        assert!(grid.within_window(18.5, 28.0));
        assert!(!grid.within_window(18.0, 28.0));
        assert!(!grid.within_window(38.0, 28.0));
    }

    #[test]
    fn test_clamp() {
        let grid = GridGeometry::default();
        assert_eq!(
            grid.clamp(Position::new(-5.0, 512.0)),
            Position::new(0.0, 400.0)
        );
    }
}
