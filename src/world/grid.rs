//! Static world grid of tile codes
//!
//! Fixed for the session. Systems read it; none of them write to it.

use rand::Rng;

use crate::core::error::{OverworldError, Result};
use crate::core::types::TileCoord;
use crate::spatial::bounds::Bounds;
use crate::spatial::grid::Grid;
use crate::world::tile::{Tile, TileKind};

/// Read-only world map, 0 = free, nonzero = blocking
#[derive(Debug, Clone, PartialEq)]
pub struct WorldGrid {
    codes: Grid<u8>,
}

impl WorldGrid {
    /// Grid with every tile free
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            codes: Grid::new(width, height),
        }
    }

    /// Build from a column-major matrix indexed `[x][y]`
    pub fn from_columns(columns: &[Vec<u8>]) -> Result<Self> {
        let width = columns.len();
        let height = columns.first().map(Vec::len).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(OverworldError::InvalidGrid("grid is empty".to_string()));
        }

        let mut codes = Grid::new(width, height);
        for (x, column) in columns.iter().enumerate() {
            if column.len() != height {
                return Err(OverworldError::InvalidGrid(format!(
                    "column {} has {} cells, expected {}",
                    x,
                    column.len(),
                    height
                )));
            }
            for (y, &code) in column.iter().enumerate() {
                codes.set(TileCoord::new(x as i32, y as i32), code);
            }
        }
        Ok(Self { codes })
    }

    /// Parse an ASCII map, one text line per row: `.` free, `#` rock
    pub fn from_ascii(map: &str) -> Result<Self> {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(OverworldError::InvalidGrid("map is empty".to_string()));
        }

        let mut codes = Grid::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(OverworldError::InvalidGrid(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, glyph) in row.chars().enumerate() {
                let code = match glyph {
                    '.' => 0,
                    '#' => 1,
                    other => {
                        return Err(OverworldError::InvalidGrid(format!(
                            "unknown glyph {:?} at {}-{}",
                            other, x, y
                        )))
                    }
                };
                codes.set(TileCoord::new(x as i32, y as i32), code);
            }
        }
        Ok(Self { codes })
    }

    /// Random map with roughly `rock_density` of the tiles blocked
    pub fn generate(width: usize, height: usize, rock_density: f32, rng: &mut impl Rng) -> Self {
        let mut codes = Grid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if rng.gen::<f32>() < rock_density {
                    codes.set(TileCoord::new(x as i32, y as i32), 1);
                }
            }
        }
        Self { codes }
    }

    pub fn width(&self) -> usize {
        self.codes.width
    }

    pub fn height(&self) -> usize {
        self.codes.height
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.codes.contains(coord)
    }

    pub fn code(&self, coord: TileCoord) -> Option<u8> {
        self.codes.get(coord).copied()
    }

    pub fn kind(&self, coord: TileCoord) -> Option<TileKind> {
        self.code(coord).map(TileKind::from_code)
    }

    /// In-bounds tile with a nonzero code
    pub fn is_blocked(&self, coord: TileCoord) -> bool {
        self.code(coord).is_some_and(|code| code != 0)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<Tile> {
        self.kind(coord).map(|kind| Tile::new(coord, kind))
    }

    /// Solid tiles that could touch `area`
    pub fn solid_tiles_near(&self, area: &Bounds) -> Vec<Tile> {
        let start_x = (area.left() - 0.5).floor() as i32;
        let start_y = (area.top() - 0.5).floor() as i32;
        let end_x = (area.right() + 0.5).ceil() as i32;
        let end_y = (area.bottom() + 0.5).ceil() as i32;

        let mut tiles = Vec::new();
        for y in start_y..=end_y {
            for x in start_x..=end_x {
                let coord = TileCoord::new(x, y);
                if self.is_blocked(coord) {
                    tiles.push(Tile::new(coord, TileKind::Rock));
                }
            }
        }
        tiles
    }

    /// Blocking flags for every tile, a copy the caller may modify
    pub fn walkability(&self) -> Grid<bool> {
        let mut blocked = Grid::filled(self.width(), self.height(), false);
        for (coord, &code) in self.codes.iter() {
            if code != 0 {
                blocked.set(coord, true);
            }
        }
        blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_from_columns_is_x_major() {
        let grid = WorldGrid::from_columns(&[vec![0, 1], vec![0, 0], vec![2, 0]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.is_blocked(TileCoord::new(0, 1)));
        assert!(grid.is_blocked(TileCoord::new(2, 0)));
        assert!(!grid.is_blocked(TileCoord::new(1, 1)));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = WorldGrid::from_columns(&[vec![0, 0], vec![0]]);
        assert!(matches!(result, Err(OverworldError::InvalidGrid(_))));
    }

    #[test]
    fn test_ascii_map() {
        let grid = WorldGrid::from_ascii(
            "
            ..#
            #..
            ",
        )
        .unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.kind(TileCoord::new(2, 0)), Some(TileKind::Rock));
        assert_eq!(grid.kind(TileCoord::new(0, 1)), Some(TileKind::Rock));
        assert_eq!(grid.kind(TileCoord::new(1, 1)), Some(TileKind::Free));
    }

    #[test]
    fn test_ascii_unknown_glyph() {
        assert!(WorldGrid::from_ascii("..x").is_err());
    }

    #[test]
    fn test_out_of_bounds_is_not_blocked() {
        let grid = WorldGrid::open(2, 2);
        assert!(!grid.is_blocked(TileCoord::new(-1, 0)));
        assert!(grid.kind(TileCoord::new(-1, 0)).is_none());
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = WorldGrid::generate(16, 16, 0.3, &mut ChaCha8Rng::seed_from_u64(9));
        let b = WorldGrid::generate(16, 16, 0.3, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_solid_tiles_near_finds_adjacent_rock() {
        let grid = WorldGrid::from_ascii(
            "
            ....
            ..#.
            ....
            ",
        )
        .unwrap();
        let near = grid.solid_tiles_near(&Bounds::new(0.6, 0.6, 0.8, 0.8));
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].coord, TileCoord::new(2, 1));
    }
}
