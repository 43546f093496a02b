use serde::Serialize;

use crate::domain::spectrum::grid::{GRID, checked_mvalue_to_slots, frequency_to_n_on_grid, is_fixed_grid};
use crate::error::{Error, Result};

/// Occupancy of the optical spectrum on one OMS.
///
/// Position `i` of the array stands for the grid cell `[f(n), f(n + 1))` with
/// `n = getn(i)`. The array covers `freq_index_min - guardband ..= freq_index_max + guardband - 1`:
/// * **Lower guardband**: `guardband` cells below `freq_index_min`.
/// * **Usable band**: `freq_index_min ..= freq_index_max - 1`, i.e. the frequencies
///   between `f(freq_index_min)` and `f(freq_index_max)`.
/// * **Upper guardband**: `guardband` cells from `freq_index_max` upward.
///
/// Guardband cells are occupied for the whole lifetime of the bitmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bitmap {
    /// `true` marks an occupied cell.
    bitmap: Vec<bool>,

    /// Grid step in Hz.
    grid: f64,

    /// Width of each guardband in grid cells.
    guardband: i64,

    freq_index_min: i64,

    freq_index_max: i64,
}

impl Bitmap {
    /// Creates an empty bitmap for the band `[f_min, f_max]` with `guardband` Hz reserved on
    /// each side.
    pub fn new(f_min: f64, f_max: f64, grid: f64, guardband: f64) -> Result<Self> {
        let (freq_index_min, freq_index_max, guardband_cells) = Bitmap::bounds_from_frequencies(f_min, f_max, grid, guardband)?;

        Bitmap::with_bounds(freq_index_min, freq_index_max, guardband_cells, grid)
    }

    /// Creates an empty bitmap from n-value bounds.
    pub fn with_bounds(freq_index_min: i64, freq_index_max: i64, guardband: i64, grid: f64) -> Result<Self> {
        if !is_fixed_grid(grid) {
            return Err(Error::InvalidConfiguration(format!("Grid step {} Hz differs from the fixed grid of {} Hz.", grid, GRID)));
        }

        if freq_index_max <= freq_index_min {
            return Err(Error::TopologyError(format!(
                "Spectrum upper bound n={} must be above lower bound n={}.",
                freq_index_max, freq_index_min
            )));
        }

        if guardband < 0 {
            return Err(Error::InvalidConfiguration(format!("Guardband of {} cells is negative.", guardband)));
        }

        let mut bitmap = Bitmap { bitmap: Vec::new(), grid, guardband, freq_index_min, freq_index_max };
        bitmap.bitmap = bitmap.fresh_cells();

        Ok(bitmap)
    }

    fn bounds_from_frequencies(f_min: f64, f_max: f64, grid: f64, guardband: f64) -> Result<(i64, i64, i64)> {
        if !is_fixed_grid(grid) {
            return Err(Error::InvalidConfiguration(format!("Grid step {} Hz differs from the fixed grid of {} Hz.", grid, GRID)));
        }

        if !(guardband.is_finite() && guardband >= 0.0) {
            return Err(Error::InvalidConfiguration(format!("Guardband {} Hz must not be negative.", guardband)));
        }

        if !(f_min.is_finite() && f_max.is_finite()) || f_max <= f_min {
            return Err(Error::TopologyError(format!("Spectrum band [{}, {}] Hz is empty.", f_min, f_max)));
        }

        let guardband_cells = (guardband / grid).round() as i64;

        Ok((frequency_to_n_on_grid(f_min, grid), frequency_to_n_on_grid(f_max, grid), guardband_cells))
    }

    /// Array with every usable cell free and every guardband cell occupied.
    fn fresh_cells(&self) -> Vec<bool> {
        let usable = (self.freq_index_max - self.freq_index_min) as usize;
        let guard = self.guardband as usize;

        let mut cells = vec![true; guard];
        cells.extend(std::iter::repeat_n(false, usable));
        cells.extend(std::iter::repeat_n(true, guard));
        cells
    }

    pub fn freq_index_min(&self) -> i64 {
        self.freq_index_min
    }

    pub fn freq_index_max(&self) -> i64 {
        self.freq_index_max
    }

    pub fn guardband(&self) -> i64 {
        self.guardband
    }

    pub fn grid(&self) -> f64 {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.bitmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    /// Raw occupancy, guardbands included.
    pub fn bits(&self) -> &[bool] {
        &self.bitmap
    }

    /// n-value of array position 0.
    pub fn first_n(&self) -> i64 {
        self.freq_index_min - self.guardband
    }

    /// n-value of the last array position.
    pub fn last_n(&self) -> i64 {
        self.freq_index_max + self.guardband - 1
    }

    /// Array position to n-value.
    pub fn getn(&self, index: usize) -> Result<i64> {
        if index >= self.bitmap.len() {
            return Err(Error::IndexOutOfRange {
                context: "bitmap position",
                value: index as i64,
                min: 0,
                max: self.bitmap.len() as i64 - 1,
            });
        }

        Ok(self.first_n() + index as i64)
    }

    /// n-value to array position.
    pub fn geti(&self, nvalue: i64) -> Result<usize> {
        if nvalue < self.first_n() || nvalue > self.last_n() {
            return Err(Error::IndexOutOfRange { context: "bitmap n-value", value: nvalue, min: self.first_n(), max: self.last_n() });
        }

        Ok((nvalue - self.first_n()) as usize)
    }

    pub fn is_usable(&self, nvalue: i64) -> bool {
        nvalue >= self.freq_index_min && nvalue < self.freq_index_max
    }

    pub fn is_occupied(&self, nvalue: i64) -> Result<bool> {
        let index = self.geti(nvalue)?;
        Ok(self.bitmap[index])
    }

    /// Checks that every cell of the slot `(n, m)` is usable and free.
    pub fn is_range_free(&self, nvalue: i64, mvalue: i64) -> bool {
        match self.usable_range(nvalue, mvalue) {
            Some((start, stop)) => self.bitmap[start..=stop].iter().all(|occupied| !occupied),
            None => false,
        }
    }

    /// Array positions of the slot `(n, m)` if it lies entirely inside the usable band.
    fn usable_range(&self, nvalue: i64, mvalue: i64) -> Option<(usize, usize)> {
        let (start_n, stop_n) = checked_mvalue_to_slots(nvalue, mvalue)?;

        if !self.is_usable(start_n) || !self.is_usable(stop_n) {
            return None;
        }

        Some(((start_n - self.first_n()) as usize, (stop_n - self.first_n()) as usize))
    }

    /// Marks the cells of the slot `(n, m)` as occupied.
    ///
    /// # Returns
    /// `true` on success. `false` if the slot leaves the usable band or overlaps an
    /// occupied cell; the bitmap is then unchanged.
    pub fn assign_spectrum(&mut self, nvalue: i64, mvalue: i64) -> bool {
        let Some((start, stop)) = self.usable_range(nvalue, mvalue) else {
            log::debug!(
                "Slot n={} m={} is outside the usable band [{}, {}).",
                nvalue,
                mvalue,
                self.freq_index_min,
                self.freq_index_max
            );
            return false;
        };

        if self.bitmap[start..=stop].iter().any(|occupied| *occupied) {
            log::debug!("Slot n={} m={} overlaps occupied spectrum.", nvalue, mvalue);
            return false;
        }

        self.bitmap[start..=stop].fill(true);
        true
    }

    /// Frees the cells of a previously assigned slot `(n, m)`.
    ///
    /// # Returns
    /// `true` on success. `false` if the slot leaves the usable band or any of its
    /// cells is free; the bitmap is then unchanged.
    pub fn release_spectrum(&mut self, nvalue: i64, mvalue: i64) -> bool {
        let Some((start, stop)) = self.usable_range(nvalue, mvalue) else {
            log::error!("Release of slot n={} m={} outside the usable band. Signals an error in the implementation.", nvalue, mvalue);
            return false;
        };

        if !self.bitmap[start..=stop].iter().all(|occupied| *occupied) {
            log::error!("Release of slot n={} m={} which is not fully assigned.", nvalue, mvalue);
            return false;
        }

        self.bitmap[start..=stop].fill(false);
        true
    }

    /// Moves the usable band to `[freq_min, freq_max]` with a new guardband.
    ///
    /// Occupancy of cells usable both before and after is kept, newly exposed usable
    /// cells start free, and everything outside the new bounds is dropped.
    pub fn update_spectrum(&mut self, freq_min: f64, freq_max: f64, grid: f64, guardband: f64) -> Result<()> {
        let (freq_index_min, freq_index_max, guardband_cells) = Bitmap::bounds_from_frequencies(freq_min, freq_max, grid, guardband)?;

        self.set_bounds(freq_index_min, freq_index_max, guardband_cells, grid)
    }

    /// Same as [`Bitmap::update_spectrum`] with bounds given as n-values.
    pub fn set_bounds(&mut self, freq_index_min: i64, freq_index_max: i64, guardband: i64, grid: f64) -> Result<()> {
        let mut resized = Bitmap::with_bounds(freq_index_min, freq_index_max, guardband, grid)?;

        let overlap_start = self.freq_index_min.max(freq_index_min);
        let overlap_stop = self.freq_index_max.min(freq_index_max);

        for nvalue in overlap_start..overlap_stop {
            let old_index = self.geti(nvalue)?;
            let new_index = resized.geti(nvalue)?;
            resized.bitmap[new_index] = self.bitmap[old_index];
        }

        *self = resized;
        Ok(())
    }

    /// Maximal runs of free usable cells, as inclusive n-value pairs in ascending order.
    pub fn free_ranges(&self) -> Vec<(i64, i64)> {
        let mut ranges = Vec::new();
        let mut run_start: Option<i64> = None;

        for nvalue in self.freq_index_min..self.freq_index_max {
            let occupied = self.bitmap[(nvalue - self.first_n()) as usize];

            match (occupied, run_start) {
                (false, None) => run_start = Some(nvalue),
                (true, Some(start)) => {
                    ranges.push((start, nvalue - 1));
                    run_start = None;
                }
                _ => {}
            }
        }

        if let Some(start) = run_start {
            ranges.push((start, self.freq_index_max - 1));
        }

        ranges
    }

    /// Number of occupied cells in the usable band.
    pub fn occupied_count(&self) -> usize {
        let start = self.guardband as usize;
        let stop = start + (self.freq_index_max - self.freq_index_min) as usize;
        self.bitmap[start..stop].iter().filter(|occupied| **occupied).count()
    }

    pub fn usable_len(&self) -> usize {
        (self.freq_index_max - self.freq_index_min) as usize
    }
}

/// Element-wise occupancy count of two equally aligned bitmaps.
///
/// A position is nonzero exactly where one of the inputs is occupied and equals `2` where
/// both are.
pub fn bitmap_sum(first: &Bitmap, second: &Bitmap) -> Result<Vec<u8>> {
    if first.len() != second.len() || first.first_n() != second.first_n() {
        return Err(Error::IndexOutOfRange {
            context: "bitmap alignment",
            value: second.first_n(),
            min: first.first_n(),
            max: first.last_n(),
        });
    }

    Ok(first.bits().iter().zip(second.bits()).map(|(a, b)| (*a as u8).saturating_add(*b as u8)).collect())
}
