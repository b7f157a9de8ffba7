//! Conway's B3/S23 transition.

use crate::grid::{ALIVE, DEAD};

/// Next state of one cell given whether it is alive and its live Moore-neighbour count.
pub fn next_state(alive: bool, neighbours: u8) -> bool {
    match (alive, neighbours) {
        (true, 2) | (true, 3) => true,   // Survival
        (false, 3)            => true,   // Birth
        _                     => false,  // Death or stays dead
    }
}

/// Byte-level form of [`next_state`].
pub fn next_cell(cell: u8, neighbours: u8) -> u8 {
    if next_state(cell == ALIVE, neighbours) { ALIVE } else { DEAD }
}
