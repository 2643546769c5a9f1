use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logical size of a display: `rows` pixels tall, `cols` pixels wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub const fn num_pixels(&self) -> usize {
        self.rows * self.cols
    }
}

/// Maps a logical `(row, col)` to the position of that pixel on the physical
/// chain of LEDs.
pub trait PixelIndexer {
    fn index(&self, row: usize, col: usize, shape: &GridShape) -> usize;
}

impl<F> PixelIndexer for F
where
    F: Fn(usize, usize, &GridShape) -> usize,
{
    fn index(&self, row: usize, col: usize, shape: &GridShape) -> usize {
        self(row, col, shape)
    }
}

/// The wiring orders of the panels in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Wiring {
    /// Row after row, left to right.
    #[default]
    Standard,
    /// Row after row, right to left.
    FlipColumnOrder,
    /// Column after column, each column wired bottom to top.
    RowsAreColumns,
    /// Row after row, every other row wired right to left.
    SerpentineRows,
    /// Column after column, every other column wired top to bottom.
    SerpentineColumns,
    /// Like `SerpentineColumns`, starting from the rightmost column.
    ReversedSerpentineColumns,
}

impl PixelIndexer for Wiring {
    fn index(&self, row: usize, col: usize, shape: &GridShape) -> usize {
        let GridShape { rows, cols } = *shape;
        match self {
            Wiring::Standard => row * cols + col,
            Wiring::FlipColumnOrder => row * cols + (cols - 1 - col),
            Wiring::RowsAreColumns => col * rows + row,
            Wiring::SerpentineRows => {
                if row % 2 == 0 {
                    row * cols + col
                } else {
                    row * cols + (cols - 1 - col)
                }
            }
            Wiring::SerpentineColumns => serpentine_column(row, col, rows),
            Wiring::ReversedSerpentineColumns => serpentine_column(row, cols - 1 - col, rows),
        }
    }
}

fn serpentine_column(row: usize, col: usize, rows: usize) -> usize {
    if col % 2 == 0 {
        col * rows + row
    } else {
        col * rows + (rows - 1 - row)
    }
}

/// Lookup table from logical `(row, col)` to physical pixel index.
///
/// Stored column-major since displays fill column by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMap {
    shape: GridShape,
    table: Vec<usize>,
}

impl PixelMap {
    pub fn build<I: PixelIndexer + ?Sized>(shape: GridShape, indexer: &I) -> Self {
        Self::build_shifted(shape, indexer, 0)
    }

    /// Builds the table with every logical column moved `column_shift` places to
    /// the right, wrapping around. A shift of `cols / 2` centres the low bands.
    pub fn build_shifted<I: PixelIndexer + ?Sized>(
        shape: GridShape,
        indexer: &I,
        column_shift: usize,
    ) -> Self {
        let GridShape { rows, cols } = shape;
        let mut table = Vec::with_capacity(shape.num_pixels());
        table.resize(shape.num_pixels(), 0);
        for col in 0..cols {
            let target = (col + column_shift) % cols;
            for row in 0..rows {
                table[target * rows + row] = indexer.index(row, col, &shape);
            }
        }
        Self { shape, table }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        self.table[col * self.shape.rows + row]
    }

    /// Physical indices of one column, from row 0 up.
    pub fn column(&self, col: usize) -> &[usize] {
        let rows = self.shape.rows;
        &self.table[col * rows..(col + 1) * rows]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn all_indices(map: &PixelMap) -> Vec<usize> {
        let shape = map.shape();
        let mut indices: Vec<usize> = (0..shape.cols)
            .flat_map(|col| (0..shape.rows).map(move |row| (row, col)))
            .map(|(row, col)| map.index(row, col))
            .collect();
        indices.sort_unstable();
        indices
    }

    #[test]
    fn test_build_reproduces_indexer() {
        let shape = GridShape::new(4, 8);
        let map = PixelMap::build(shape, &|row: usize, col: usize, _: &GridShape| row * 8 + col);
        for row in 0..4 {
            for col in 0..8 {
                assert_eq!(map.index(row, col), row * 8 + col);
            }
        }
    }

    #[test]
    fn test_every_wiring_is_a_permutation() {
        let shape = GridShape::new(6, 12);
        let expected: Vec<usize> = (0..shape.num_pixels()).collect();
        for wiring in [
            Wiring::Standard,
            Wiring::FlipColumnOrder,
            Wiring::RowsAreColumns,
            Wiring::SerpentineRows,
            Wiring::SerpentineColumns,
            Wiring::ReversedSerpentineColumns,
        ] {
            let map = PixelMap::build(shape, &wiring);
            assert_eq!(all_indices(&map), expected, "{:?}", wiring);
        }
    }

    #[test]
    fn test_wiring_orders() {
        let shape = GridShape::new(3, 4);
        let idx = |wiring: Wiring, row, col| wiring.index(row, col, &shape);

        assert_eq!(idx(Wiring::Standard, 1, 2), 6);
        assert_eq!(idx(Wiring::FlipColumnOrder, 1, 0), 7);
        assert_eq!(idx(Wiring::RowsAreColumns, 1, 2), 7);
        assert_eq!(idx(Wiring::SerpentineRows, 1, 0), 7);
        assert_eq!(idx(Wiring::SerpentineRows, 2, 0), 8);
        assert_eq!(idx(Wiring::SerpentineColumns, 0, 1), 5);
        assert_eq!(idx(Wiring::SerpentineColumns, 2, 1), 3);
        assert_eq!(idx(Wiring::ReversedSerpentineColumns, 0, 3), 0);
        assert_eq!(idx(Wiring::ReversedSerpentineColumns, 0, 2), 5);
    }

    #[test]
    fn test_shift_moves_columns_and_wraps() {
        let shape = GridShape::new(2, 4);
        let plain = PixelMap::build(shape, &Wiring::Standard);
        let shifted = PixelMap::build_shifted(shape, &Wiring::Standard, 2);
        for col in 0..4 {
            assert_eq!(shifted.column((col + 2) % 4), plain.column(col));
        }
        assert_eq!(shifted.column(0), &[2, 6]);
        assert_eq!(all_indices(&shifted), all_indices(&plain));
    }

    #[test]
    fn test_column_slices_run_from_row_zero() {
        let map = PixelMap::build(GridShape::new(3, 2), &Wiring::Standard);
        assert_eq!(map.column(0), &[0, 2, 4]);
        assert_eq!(map.column(1), &[1, 3, 5]);
        assert_eq!(map.column(1), vec![1, 3, 5].as_slice());
    }
}
