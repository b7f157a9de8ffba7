//! Splitting the grid into horizontal bands and locating their halo rows.

use crate::error::ConfigError;

/// Half-open row range `[start_y, start_y + height)` owned by one worker for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub index: usize,
    pub start_y: usize,
    pub height: usize,
}

impl Band {
    pub fn end_y(&self) -> usize {
        self.start_y + self.height
    }

    pub fn last_y(&self) -> usize {
        self.end_y() - 1
    }
}

/// Row indices of a band's upper and lower halo in the full grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaloRows {
    pub upper: usize,
    pub lower: usize,
}

/// `threads` contiguous bands of `image_height / threads` rows; the last band
/// also takes the `image_height % threads` leftover rows.
pub fn partition(image_height: usize, threads: usize) -> Result<Vec<Band>, ConfigError> {
    if threads == 0 || threads > image_height {
        return Err(ConfigError::BadThreadCount { threads, height: image_height });
    }
    let slice = image_height / threads;
    let bands = (0..threads)
        .map(|index| {
            let extra = if index == threads - 1 { image_height % threads } else { 0 };
            Band { index, start_y: index * slice, height: slice + extra }
        })
        .collect();
    Ok(bands)
}

/// Upper halo is the previous band's last row, lower halo the next band's
/// first row, wrapping around both ends. A single band wraps onto itself.
pub fn halo_rows(bands: &[Band], index: usize) -> HaloRows {
    let n = bands.len();
    let above = &bands[(index + n - 1) % n];
    let below = &bands[(index + 1) % n];
    HaloRows { upper: above.last_y(), lower: below.start_y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn remainder_goes_to_the_last_band() {
        let bands = partition(10, 3).unwrap();
        let heights: Vec<_> = bands.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![3, 3, 4]);
        assert_eq!(bands[2].start_y, 6);
    }

    #[test]
    fn halos_wrap_around_the_torus() {
        let bands = partition(10, 3).unwrap();
        assert_eq!(halo_rows(&bands, 0), HaloRows { upper: 9, lower: 3 });
        assert_eq!(halo_rows(&bands, 1), HaloRows { upper: 2, lower: 6 });
        assert_eq!(halo_rows(&bands, 2), HaloRows { upper: 5, lower: 0 });
    }

    #[test]
    fn single_band_halos_are_its_own_edges() {
        let bands = partition(7, 1).unwrap();
        assert_eq!(bands, vec![Band { index: 0, start_y: 0, height: 7 }]);
        assert_eq!(halo_rows(&bands, 0), HaloRows { upper: 6, lower: 0 });
    }

    #[test]
    fn rejects_bad_thread_counts() {
        assert!(partition(4, 0).is_err());
        assert!(partition(4, 5).is_err());
    }

    proptest! {
        #[test]
        fn bands_cover_every_row_once(height in 1usize..200, seed in 0usize..1000) {
            let threads = seed % height + 1;
            let bands = partition(height, threads).unwrap();
            prop_assert_eq!(bands.len(), threads);

            let mut next = 0;
            for (i, band) in bands.iter().enumerate() {
                prop_assert_eq!(band.index, i);
                prop_assert_eq!(band.start_y, next);
                prop_assert!(band.height > 0);
                next = band.end_y();
            }
            prop_assert_eq!(next, height);
            prop_assert_eq!(bands[threads - 1].height, height / threads + height % threads);
        }
    }
}
