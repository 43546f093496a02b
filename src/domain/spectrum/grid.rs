//! ITU-T G.694.1 flexible grid arithmetic.
//!
//! Frequencies are in Hz. An n-value indexes the 6.25 GHz grid relative to 193.1 THz.
//! A slot `(n, m)` covers the grid cells `n - m ..= n + m - 1`, i.e. `m` units of
//! 12.5 GHz centered on `f(n)`.

/// Reference frequency of the grid (n = 0).
pub const REFERENCE_FREQUENCY: f64 = 193.1e12;

/// Fundamental grid granularity.
pub const GRID: f64 = 0.00625e12;

/// Slot width granularity, two grid cells.
pub const SLOT_WIDTH: f64 = 0.0125e12;

pub fn frequency_to_n(freq: f64) -> i64 {
    frequency_to_n_on_grid(freq, GRID)
}

pub fn frequency_to_n_on_grid(freq: f64, grid: f64) -> i64 {
    ((freq - REFERENCE_FREQUENCY) / grid).round() as i64
}

pub fn nvalue_to_frequency(nvalue: i64) -> f64 {
    nvalue_to_frequency_on_grid(nvalue, GRID)
}

pub fn nvalue_to_frequency_on_grid(nvalue: i64, grid: f64) -> f64 {
    REFERENCE_FREQUENCY + nvalue as f64 * grid
}

/// First and last grid cell covered by the slot `(n, m)`.
pub fn mvalue_to_slots(nvalue: i64, mvalue: i64) -> (i64, i64) {
    (nvalue - mvalue, nvalue + mvalue - 1)
}

/// Overflow-checked [`mvalue_to_slots`].
///
/// # Returns
/// `None` when `m < 1` or the cell bounds do not fit an `i64`.
pub fn checked_mvalue_to_slots(nvalue: i64, mvalue: i64) -> Option<(i64, i64)> {
    if mvalue < 1 {
        return None;
    }

    Some((nvalue.checked_sub(mvalue)?, nvalue.checked_add(mvalue)?.checked_sub(1)?))
}

/// Checks that `grid` is the fixed grid step [`GRID`].
pub fn is_fixed_grid(grid: f64) -> bool {
    (grid - GRID).abs() < 1.0
}

/// Inverse of [`mvalue_to_slots`].
pub fn slots_to_nm(start_n: i64, stop_n: i64) -> (i64, i64) {
    ((start_n + stop_n + 1).div_euclid(2), (stop_n - start_n + 1).div_euclid(2))
}

/// Edge frequencies of the slot `(n, m)`.
pub fn m_to_freq(nvalue: i64, mvalue: i64) -> (f64, f64) {
    (nvalue_to_frequency(nvalue - mvalue), nvalue_to_frequency(nvalue + mvalue))
}

/// Slot `(n, m)` whose edges are `f_start` and `f_stop`. Exact inverse of [`m_to_freq`].
pub fn slots_to_m(f_start: f64, f_stop: f64) -> (i64, i64) {
    let start_n = frequency_to_n(f_start);
    let stop_n = frequency_to_n(f_stop);

    ((start_n + stop_n).div_euclid(2), (stop_n - start_n).div_euclid(2))
}

/// Half-width needed to carry `nb_channel` channels of `spacing` Hz.
pub fn required_m(spacing: f64, nb_channel: u32) -> i64 {
    let m = ((spacing * nb_channel as f64) / SLOT_WIDTH).ceil() as i64;
    m.max(1)
}
