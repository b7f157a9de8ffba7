//! Seed patterns and a reproducible random fill for starting images.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::grid::{ALIVE, Grid};

/// A named seed. Cells are `(x, y)` offsets from the stamp origin.
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 0), (1, 0), (2, 0)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "pulsar",
        cells: &[
            // Top section
            (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
            (0, 2), (5, 2), (7, 2), (12, 2),
            (0, 3), (5, 3), (7, 3), (12, 3),
            (0, 4), (5, 4), (7, 4), (12, 4),
            (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
            // Bottom section (mirrored)
            (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
            (0, 8), (5, 8), (7, 8), (12, 8),
            (0, 9), (5, 9), (7, 9), (12, 9),
            (0, 10), (5, 10), (7, 10), (12, 10),
            (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
        ],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
    Pattern {
        name: "gosper-glider-gun",
        cells: &[
            (0, 4), (1, 4), (0, 5), (1, 5),
            (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
            (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
            (16, 6), (17, 5), (20, 2), (20, 3), (20, 4), (21, 2), (21, 3),
            (21, 4), (22, 1), (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
];

pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Stamps `pattern` onto `grid` with its origin at `(x0, y0)`, wrapping at the edges.
pub fn apply_pattern(grid: &mut Grid, pattern: &Pattern, x0: usize, y0: usize) {
    let (w, h) = (grid.width(), grid.height());
    for &(x, y) in pattern.cells {
        grid.set((x0 + x) % w, (y0 + y) % h, ALIVE);
    }
}

/// Roughly a third of the cells alive, reproducible from `seed_value`.
pub fn apply_random_pattern(grid: &mut Grid, seed_value: u64) {
    // Simple pseudo-random generator
    let mut hasher = DefaultHasher::new();
    seed_value.hash(&mut hasher);
    let mut seed = hasher.finish();

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            if (seed >> 16) % 3 == 0 {
                grid.set(x, y, ALIVE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn names_are_unique_and_findable() {
        for p in PATTERNS {
            assert!(std::ptr::eq(find(p.name).unwrap(), p));
        }
        assert!(find("GLIDER").is_some());
        assert!(find("spaceship").is_none());
    }

    #[test]
    fn stamps_wrap_around_edges() {
        let mut grid = Grid::new(4, 4);
        apply_pattern(&mut grid, find("blinker").unwrap(), 3, 3);
        assert_eq!(grid.alive_cells(), vec![Cell::new(0, 3), Cell::new(1, 3), Cell::new(3, 3)]);
    }

    #[test]
    fn random_fill_is_reproducible() {
        let mut a = Grid::new(32, 32);
        let mut b = Grid::new(32, 32);
        apply_random_pattern(&mut a, 7);
        apply_random_pattern(&mut b, 7);
        assert_eq!(a, b);
        let alive = a.alive_count();
        assert!(alive > 200 && alive < 500, "alive = {alive}");
    }
}
