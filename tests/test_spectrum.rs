use optical_path_planner::domain::oms::oms::Oms;
use optical_path_planner::domain::oms::partitioner::align_grids;
use optical_path_planner::domain::spectrum::bitmap::{Bitmap, bitmap_sum};
use optical_path_planner::domain::spectrum::grid::{GRID, m_to_freq, slots_to_m};

fn c_band() -> Bitmap {
    Bitmap::new(191.3e12, 196.1e12, GRID, 0.15e12).unwrap()
}

#[test]
fn test_m_to_freq_reference_values() {
    assert_eq!(m_to_freq(13, 7), (193137500000000.0, 193225000000000.0));
    assert_eq!(slots_to_m(193137500000000.0, 193225000000000.0), (13, 7));
}

#[test]
fn test_slot_frequency_round_trip() {
    for nvalue in [-288, -100, -1, 0, 1, 57, 400] {
        for mvalue in [1, 2, 4, 8, 16] {
            let (f_start, f_stop) = m_to_freq(nvalue, mvalue);
            assert_eq!(slots_to_m(f_start, f_stop), (nvalue, mvalue), "round trip failed for n={} m={}", nvalue, mvalue);
        }
    }
}

#[test]
fn test_c_band_layout() {
    let bitmap = c_band();

    assert_eq!(bitmap.freq_index_min(), -288);
    assert_eq!(bitmap.freq_index_max(), 480);
    assert_eq!(bitmap.guardband(), 24);
    assert_eq!(bitmap.len(), 768 + 2 * 24);
    assert!(bitmap.is_occupied(-289).unwrap(), "lower guardband must be occupied");
    assert!(bitmap.is_occupied(480).unwrap(), "upper guardband must be occupied");
    assert_eq!(bitmap.free_ranges(), vec![(-288, 479)]);
}

#[test]
fn test_assignment_is_atomic() {
    let mut bitmap = c_band();
    assert!(bitmap.assign_spectrum(0, 4));
    let before = bitmap.clone();

    // overlaps the first slot by one cell
    assert!(!bitmap.assign_spectrum(7, 4));
    assert_eq!(bitmap, before);

    // crosses the lower edge of the usable band
    assert!(!bitmap.assign_spectrum(-286, 4));
    assert_eq!(bitmap, before);

    assert!(bitmap.assign_spectrum(8, 4));
    assert!(bitmap.release_spectrum(0, 4));
    assert!(!bitmap.release_spectrum(0, 4), "double release must fail");
}

#[test]
fn test_non_collision() {
    let mut first = c_band();
    let mut second = c_band();
    assert!(first.assign_spectrum(0, 4));
    assert!(second.assign_spectrum(8, 4));

    let sum = bitmap_sum(&first, &second).unwrap();
    let guard = first.guardband() as usize;
    let usable = &sum[guard..guard + first.usable_len()];

    assert!(usable.iter().all(|count| *count < 2), "disjoint slots must never overlap");
    assert_eq!(usable.iter().filter(|count| **count == 1).count(), 16);

    assert!(second.assign_spectrum(0, 4));
    let sum = bitmap_sum(&first, &second).unwrap();
    assert_eq!(sum[guard..guard + first.usable_len()].iter().filter(|count| **count == 2).count(), 8);
}

#[test]
fn test_align_grids_widens_and_keeps_occupancy() {
    let mut narrow = Oms::new(0, Bitmap::new(192.0e12, 195.0e12, GRID, 0.15e12).unwrap());
    let wide = Oms::new(1, c_band());
    assert!(narrow.assign_spectrum(-100, 4));

    let mut oms_list = vec![narrow, wide];
    align_grids(&mut oms_list).unwrap();

    for oms in &oms_list {
        assert_eq!(oms.spectrum_bitmap().freq_index_min(), -288);
        assert_eq!(oms.spectrum_bitmap().freq_index_max(), 480);
    }
    assert!(oms_list[0].spectrum_bitmap().is_occupied(-104).unwrap());
    assert!(!oms_list[0].spectrum_bitmap().is_occupied(-288).unwrap(), "newly exposed cells start free");
    assert!(bitmap_sum(oms_list[0].spectrum_bitmap(), oms_list[1].spectrum_bitmap()).is_ok());
}

#[test]
fn test_fragmentation_grows_with_scattered_slots() {
    let mut bitmap = c_band();
    let empty = bitmap.fragmentation();

    assert!(bitmap.assign_spectrum(0, 4));
    assert!(bitmap.assign_spectrum(200, 4));

    assert_eq!(empty, 0.0);
    assert!(bitmap.fragmentation() > 0.0);
}
