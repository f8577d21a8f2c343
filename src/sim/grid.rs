//! Grid occupancy, placement and relocation
//!
//! The occupied set always mirrors the cells of the placed options: every
//! placed option owns exactly one cell and no two options share one.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::{Cell, GameOption};
use crate::settings::ConfigError;

/// A relocation performed by a move tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub id: u32,
    pub from: Option<Cell>,
    pub to: Cell,
}

/// The option grid and its occupied set
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    occupied: HashSet<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            occupied: HashSet::new(),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupied.contains(&cell)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Free cells in row-major order
    pub fn empty_cells(&self) -> Vec<Cell> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Cell::new(row, col)))
            .filter(|cell| !self.occupied.contains(cell))
            .collect()
    }

    /// Place options in list order, each on the first free cell scanning
    /// row-major from (0, 0). Options left over when the grid runs out stay
    /// unplaced. Returns the number placed.
    pub fn place_all(&mut self, options: &mut [GameOption]) -> Result<usize, ConfigError> {
        let mut row = 0;
        let mut col = 0;
        let mut placed = 0;
        let total = options.len();
        options.iter_mut().for_each(|o| o.cell = None);

        for option in options.iter_mut() {
            while row < self.rows && self.occupied.contains(&Cell::new(row, col)) {
                col += 1;
                if col >= self.cols {
                    col = 0;
                    row += 1;
                }
            }
            if row >= self.rows || self.cols == 0 {
                log::debug!("placement stopped after {placed} options");
                return Err(ConfigError::GridTooSmall {
                    rows: self.rows,
                    cols: self.cols,
                    options: total,
                });
            }
            let cell = Cell::new(row, col);
            self.occupied.insert(cell);
            option.cell = Some(cell);
            placed += 1;
        }

        Ok(placed)
    }

    /// Move one randomly chosen option to a randomly chosen free cell.
    /// No-op when the grid is full or there are no options.
    pub fn relocate_one<R: Rng + ?Sized>(
        &mut self,
        options: &mut [GameOption],
        rng: &mut R,
    ) -> Option<Relocation> {
        let empty = self.empty_cells();
        let &to = empty.choose(rng)?;
        if options.is_empty() {
            return None;
        }
        let option = &mut options[rng.random_range(0..options.len())];

        let from = option.cell;
        if let Some(old) = from {
            self.occupied.remove(&old);
        }
        self.occupied.insert(to);
        option.cell = Some(to);

        Some(Relocation {
            id: option.id,
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn options(n: usize) -> Vec<GameOption> {
        (0..n)
            .map(|i| GameOption {
                id: i as u32 + 1,
                letters: format!("A{}", (b'A' + i as u8) as char),
                is_correct: i == 0,
                cell: None,
            })
            .collect()
    }

    fn assert_consistent(grid: &Grid, opts: &[GameOption]) {
        let cells: HashSet<Cell> = opts.iter().filter_map(|o| o.cell).collect();
        let placed = opts.iter().filter(|o| o.cell.is_some()).count();
        assert_eq!(cells.len(), placed, "two options share a cell");
        assert_eq!(grid.occupied_count(), placed);
        for cell in cells {
            assert!(grid.is_occupied(cell));
            assert!(grid.contains(cell));
        }
    }

    #[test]
    fn test_place_row_major() {
        let mut grid = Grid::new(2, 3);
        let mut opts = options(4);
        assert_eq!(grid.place_all(&mut opts), Ok(4));

        let cells: Vec<Cell> = opts.iter().filter_map(|o| o.cell).collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]
        );
        assert_consistent(&grid, &opts);
    }

    #[test]
    fn test_place_exhausted_grid_leaves_rest_unplaced() {
        let mut grid = Grid::new(2, 2);
        let mut opts = options(6);
        assert!(matches!(
            grid.place_all(&mut opts),
            Err(ConfigError::GridTooSmall { rows: 2, cols: 2, options: 6 })
        ));

        assert_eq!(opts.iter().filter(|o| o.cell.is_some()).count(), 4);
        assert!(opts[4].cell.is_none());
        assert!(opts[5].cell.is_none());
        assert_consistent(&grid, &opts);
    }

    #[test]
    fn test_place_zero_width_grid() {
        let mut grid = Grid::new(3, 0);
        let mut opts = options(1);
        assert!(grid.place_all(&mut opts).is_err());
        assert!(opts[0].cell.is_none());
    }

    #[test]
    fn test_empty_cells_row_major() {
        let mut grid = Grid::new(2, 2);
        let mut opts = options(1);
        grid.place_all(&mut opts).unwrap();
        assert_eq!(
            grid.empty_cells(),
            vec![Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]
        );
    }

    #[test]
    fn test_relocate_moves_into_free_cell() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut grid = Grid::new(3, 3);
        let mut opts = options(4);
        grid.place_all(&mut opts).unwrap();

        for _ in 0..50 {
            let before = grid.empty_cells();
            let moved = grid.relocate_one(&mut opts, &mut rng).unwrap();
            assert!(before.contains(&moved.to));
            assert_eq!(opts.iter().find(|o| o.id == moved.id).unwrap().cell, Some(moved.to));
            assert_consistent(&grid, &opts);
        }
    }

    #[test]
    fn test_relocate_full_grid_is_noop() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut grid = Grid::new(2, 2);
        let mut opts = options(4);
        grid.place_all(&mut opts).unwrap();
        let snapshot = opts.clone();

        assert_eq!(grid.relocate_one(&mut opts, &mut rng), None);
        assert_eq!(opts, snapshot);
    }
}
