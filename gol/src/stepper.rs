//! Slice stepper: next generation for one band plus its halo rows.
//!
//! Columns always wrap. For the band's first and last rows the neighbour
//! row comes from the halo; without a halo the band must span the whole
//! grid and wraps onto itself.

use crate::error::StepError;
use crate::grid::{ALIVE, TRow};
use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::rule::next_cell;

/// Checks the request's shape before any row is evaluated.
pub fn validate(req: &WorkerRequest) -> Result<(), StepError> {
    let past_end = req.start_y.checked_add(req.height).is_none_or(|end| end > req.image_height);
    if req.height == 0 || past_end {
        return Err(StepError::OutOfBounds {
            start_y: req.start_y,
            height: req.height,
            image_height: req.image_height,
        });
    }
    if req.rows.len() != req.height {
        return Err(StepError::RowCount { expected: req.height, actual: req.rows.len() });
    }
    if let Some((row, r)) = req.rows.iter().enumerate().find(|(_, r)| r.len() != req.image_width) {
        return Err(StepError::RowWidth { row, expected: req.image_width, actual: r.len() });
    }

    let whole_grid = req.height == req.image_height;
    for (which, halo) in [("upper", &req.halo_upper), ("lower", &req.halo_lower)] {
        match halo {
            Some(h) if h.len() != req.image_width => {
                return Err(StepError::HaloWidth { which, expected: req.image_width, actual: h.len() });
            }
            None if !whole_grid => return Err(StepError::MissingHalo { which }),
            _ => {}
        }
    }
    Ok(())
}

/// Row `y` of the band (band-relative) extended by one row either side.
fn neighbour_row(req: &WorkerRequest, y: isize) -> &[u8] {
    let h = req.height as isize;
    if y < 0 {
        match &req.halo_upper {
            Some(halo) => halo,
            None => &req.rows[(y + h) as usize],
        }
    } else if y >= h {
        match &req.halo_lower {
            Some(halo) => halo,
            None => &req.rows[(y - h) as usize],
        }
    } else {
        &req.rows[y as usize]
    }
}

/// Next generation of band-relative row `y`. The request must have passed [`validate`].
pub fn step_row(req: &WorkerRequest, y: usize) -> TRow {
    let width = req.image_width;
    let y = y as isize;
    let above = neighbour_row(req, y - 1);
    let here = neighbour_row(req, y);
    let below = neighbour_row(req, y + 1);

    (0..width)
        .map(|x| {
            let left = (x + width - 1) % width;
            let right = (x + 1) % width;
            let neighbours = [
                above[left], above[x], above[right],
                here[left],            here[right],
                below[left], below[x], below[right],
            ]
            .iter()
            .filter(|&&b| b == ALIVE)
            .count() as u8;
            next_cell(here[x], neighbours)
        })
        .collect()
}

/// Whole-band step.
pub fn step_band(req: &WorkerRequest) -> Result<WorkerResponse, StepError> {
    validate(req)?;
    let rows = (0..req.height).map(|y| step_row(req, y)).collect();
    Ok(WorkerResponse { rows })
}
