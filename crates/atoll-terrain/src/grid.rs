//! Owned 2D grid indexed `[x, y]`.

use std::ops::{Index, IndexMut};

/// A dense 2D grid of `T`, `x` in `[0, width)` and `y` in `[0, height)`.
///
/// Stored column-major (`x * height + y`) so that iterating `x` then `y`
/// walks memory linearly, which is the order every stage visits cells in.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid filled with `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Create a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a grid from rows given top to bottom (`rows[y][x]`).
    ///
    /// Handy for writing fixtures the way they read on screen.
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self
    where
        T: Clone,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        assert!(
            rows.iter().all(|r| r.as_ref().len() == width),
            "all rows must have the same length"
        );
        Self::from_fn(width, height, |x, y| rows[y].as_ref()[x].clone())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns `true` if `(x, y)` lies inside the grid. Accepts signed
    /// coordinates so neighbour offsets can be tested directly.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: i64, y: i64) -> Option<&T> {
        if self.contains(x, y) {
            Some(&self.cells[self.offset(x as usize, y as usize)])
        } else {
            None
        }
    }

    /// Map every cell into a new grid of the same shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }

    /// Iterate `(x, y, &cell)` in `x`-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let height = self.height.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (i / height, i % height, c))
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        &self.cells[self.offset(x, y)]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        let offset = self.offset(x, y);
        &mut self.cells[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_indexing() {
        let grid = Grid::from_fn(3, 2, |x, y| x * 10 + y);
        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid[(2, 1)], 21);
        assert_eq!(grid[(0, 1)], 1);
    }

    #[test]
    fn test_from_rows_reads_like_screen() {
        let grid = Grid::from_rows(&[[1, 2, 3], [4, 5, 6]]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid[(2, 0)], 3);
        assert_eq!(grid[(0, 1)], 4);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = Grid::filled(2, 2, 7u32);
        assert_eq!(grid.get(1, 1), Some(&7));
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_iter_visits_x_major() {
        let grid = Grid::from_fn(2, 2, |x, y| (x, y));
        let order: Vec<_> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(grid.iter().all(|(x, y, c)| *c == (x, y)));
    }

    #[test]
    fn test_map_preserves_shape() {
        let grid = Grid::from_fn(4, 3, |x, y| (x + y) as f32);
        let doubled = grid.map(|v| *v * 2.0);
        assert_eq!(doubled.dimensions(), (4, 3));
        assert_eq!(doubled[(3, 2)], 10.0);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_panics() {
        let grid = Grid::filled(2, 2, 0u8);
        let _ = grid[(2, 0)];
    }
}
