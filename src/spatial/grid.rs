//! Generic dense grid addressed by tile coordinates

use crate::core::types::TileCoord;

/// Dense 2D grid, one cell per tile, origin at tile (0, 0)
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: Clone> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    fn index(&self, coord: TileCoord) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        let (x, y) = (coord.x as usize, coord.y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.index(coord).is_some()
    }

    #[inline]
    pub fn get(&self, coord: TileCoord) -> Option<&T> {
        self.index(coord).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, coord: TileCoord) -> Option<&mut T> {
        self.index(coord).map(move |i| &mut self.data[i])
    }

    /// Write a cell; out-of-range writes are ignored
    #[inline]
    pub fn set(&mut self, coord: TileCoord, value: T) {
        if let Some(i) = self.index(coord) {
            self.data[i] = value;
        }
    }

    /// All coordinates with their values, row by row
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &T)> + '_ {
        let width = self.width;
        self.data.iter().enumerate().map(move |(i, value)| {
            (TileCoord::new((i % width) as i32, (i / width) as i32), value)
        })
    }
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_none() {
        let grid: Grid<u8> = Grid::new(3, 2);
        assert!(grid.get(TileCoord::new(-1, 0)).is_none());
        assert!(grid.get(TileCoord::new(3, 0)).is_none());
        assert!(grid.get(TileCoord::new(0, 2)).is_none());
        assert_eq!(grid.get(TileCoord::new(2, 1)), Some(&0));
    }

    #[test]
    fn test_set_and_iter_agree() {
        let mut grid: Grid<bool> = Grid::new(3, 3);
        grid.set(TileCoord::new(1, 2), true);
        grid.set(TileCoord::new(7, 7), true);

        let set: Vec<TileCoord> = grid.iter().filter(|(_, v)| **v).map(|(c, _)| c).collect();
        assert_eq!(set, vec![TileCoord::new(1, 2)]);
    }
}
