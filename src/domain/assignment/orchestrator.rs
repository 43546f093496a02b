use serde::Serialize;

use crate::domain::oms::oms::Oms;
use crate::domain::oms::partitioner::OmsLinkIndex;
use crate::domain::routing::computed_path::ComputedPath;
use crate::domain::spectrum::bitmap::Bitmap;
use crate::domain::spectrum::grid::{checked_mvalue_to_slots, m_to_freq};
use crate::domain::topology::graph::TopologyGraph;
use crate::domain::utils::id::OmsId;
use crate::error::{BlockingReason, Error, Result};

/// Spectrum slot held by a served request on every OMS of its forward and reverse path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumAssignment {
    pub n: i64,
    pub m: i64,
    pub freq_start: f64,
    pub freq_stop: f64,
}

impl SpectrumAssignment {
    pub fn new(n: i64, m: i64) -> Self {
        let (freq_start, freq_stop) = m_to_freq(n, m);
        Self { n, m, freq_start, freq_stop }
    }
}

/// What a request asks of the spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotDemand {
    /// Half-width needed by the channels.
    pub required_m: i64,
    pub requested_n: Option<i64>,
    pub requested_m: Option<i64>,
}

/// Distinct OMS ids traversed by `paths`, in traversal order.
pub fn path_oms_ids(paths: &[&ComputedPath], topology: &TopologyGraph, oms_index: &OmsLinkIndex) -> Vec<OmsId> {
    let mut oms_ids: Vec<OmsId> = Vec::new();

    for path in paths {
        for (from, to) in path.links() {
            let Some(key_pair) = topology.key_of(from).zip(topology.key_of(to)) else {
                continue;
            };

            if let Some(&oms_id) = oms_index.get(&key_pair)
                && !oms_ids.contains(&oms_id)
            {
                oms_ids.push(oms_id);
            }
        }
    }

    oms_ids
}

/// Intersection of two ascending lists of inclusive ranges.
fn intersect_ranges(first: &[(i64, i64)], second: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < first.len() && j < second.len() {
        let start = first[i].0.max(second[j].0);
        let stop = first[i].1.min(second[j].1);

        if start <= stop {
            result.push((start, stop));
        }

        if first[i].1 < second[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}

/// Allocates one common slot on a set of OMS bitmaps.
///
/// The orchestrator borrows the OMS list mutably for its lifetime and is the only writer
/// of the bitmaps during a planning run.
pub struct SpectrumOrchestrator<'a> {
    oms_list: &'a mut [Oms],

    /// Bitmap of the configured band, used when a path crosses no OMS.
    band: &'a Bitmap,
}

impl<'a> SpectrumOrchestrator<'a> {
    pub fn new(oms_list: &'a mut [Oms], band: &'a Bitmap) -> Self {
        Self { oms_list, band }
    }

    fn check_oms_ids(&self, oms_ids: &[OmsId]) -> Result<()> {
        for &oms_id in oms_ids {
            if oms_id >= self.oms_list.len() {
                return Err(Error::IndexOutOfRange {
                    context: "oms id",
                    value: oms_id as i64,
                    min: 0,
                    max: self.oms_list.len() as i64 - 1,
                });
            }
        }
        Ok(())
    }

    /// Free spectrum common to every OMS in `oms_ids`.
    ///
    /// # Returns
    /// Inclusive n-value ranges, lowest frequency first.
    pub fn common_free_ranges(&self, oms_ids: &[OmsId]) -> Result<Vec<(i64, i64)>> {
        self.check_oms_ids(oms_ids)?;

        let Some((&first, rest)) = oms_ids.split_first() else {
            return Ok(self.band.free_ranges());
        };

        let mut ranges = self.oms_list[first].spectrum_bitmap().free_ranges();
        for &oms_id in rest {
            if ranges.is_empty() {
                break;
            }
            ranges = intersect_ranges(&ranges, &self.oms_list[oms_id].spectrum_bitmap().free_ranges());
        }

        Ok(ranges)
    }

    /// Picks the slot to assign.
    ///
    /// ### Algorithm Logic
    /// * `m` is the requested half-width, or the required one when none is requested. A
    ///   requested width below the required one is rejected.
    /// * A requested `n` is only validated against the free ranges.
    /// * Otherwise first fit: the lowest range with at least `2m` cells yields `n = start + m`.
    pub fn select_slot(ranges: &[(i64, i64)], demand: &SlotDemand) -> std::result::Result<(i64, i64), BlockingReason> {
        let mvalue = match demand.requested_m {
            Some(requested_m) if requested_m < demand.required_m => {
                return Err(BlockingReason::SpectrumAssignmentError(format!(
                    "requested m={} is smaller than the m={} required by the channels",
                    requested_m, demand.required_m
                )));
            }
            Some(requested_m) => requested_m,
            None => demand.required_m,
        };

        if mvalue < 1 {
            return Err(BlockingReason::SpectrumAssignmentError(format!("slot width m={} is not positive", mvalue)));
        }

        let Some(width) = mvalue.checked_mul(2) else {
            return Err(BlockingReason::SpectrumAssignmentError(format!("slot width m={} exceeds any band", mvalue)));
        };

        if let Some(nvalue) = demand.requested_n {
            let fits = checked_mvalue_to_slots(nvalue, mvalue)
                .is_some_and(|(start_n, stop_n)| ranges.iter().any(|(start, stop)| *start <= start_n && stop_n <= *stop));
            if fits {
                return Ok((nvalue, mvalue));
            }

            return Err(BlockingReason::SpectrumAssignmentError(format!("requested slot n={} m={} is not free on the path", nvalue, mvalue)));
        }

        ranges
            .iter()
            .find(|(start, stop)| stop - start + 1 >= width)
            .map(|(start, _)| (start + mvalue, mvalue))
            .ok_or_else(|| BlockingReason::SpectrumAssignmentError(format!("no common free range of {} cells on the path", width)))
    }

    /// Assigns a slot for `demand` on every OMS in `oms_ids`, all or nothing.
    ///
    /// # Returns
    /// * `Err(Error)`: an OMS id does not exist. Fatal.
    /// * `Ok(Err(BlockingReason))`: no slot could be assigned. Every bitmap is unchanged.
    /// * `Ok(Ok(assignment))`: the slot is now occupied on every listed OMS.
    pub fn assign(&mut self, oms_ids: &[OmsId], demand: &SlotDemand) -> Result<std::result::Result<SpectrumAssignment, BlockingReason>> {
        let ranges = self.common_free_ranges(oms_ids)?;

        let (nvalue, mvalue) = match SpectrumOrchestrator::select_slot(&ranges, demand) {
            Ok(slot) => slot,
            Err(reason) => return Ok(Err(reason)),
        };

        let mut applied: Vec<OmsId> = Vec::with_capacity(oms_ids.len());
        for &oms_id in oms_ids {
            if self.oms_list[oms_id].assign_spectrum(nvalue, mvalue) {
                applied.push(oms_id);
                continue;
            }

            log::warn!("OMS {} rejected slot n={} m={}; rolling back {} OMS.", oms_id, nvalue, mvalue, applied.len());
            self.rollback(&applied, nvalue, mvalue);

            return Ok(Err(BlockingReason::SpectrumAssignmentError(format!("OMS {} rejected slot n={} m={}", oms_id, nvalue, mvalue))));
        }

        Ok(Ok(SpectrumAssignment::new(nvalue, mvalue)))
    }

    fn rollback(&mut self, applied: &[OmsId], nvalue: i64, mvalue: i64) {
        for &oms_id in applied.iter().rev() {
            if !self.oms_list[oms_id].release_spectrum(nvalue, mvalue) {
                log::error!("Rollback of n={} m={} on OMS {} failed.", nvalue, mvalue, oms_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spectrum::grid::GRID;

    fn oms_list(count: usize) -> Vec<Oms> {
        (0..count).map(|oms_id| Oms::new(oms_id, Bitmap::with_bounds(0, 40, 2, GRID).unwrap())).collect()
    }

    fn demand(required_m: i64) -> SlotDemand {
        SlotDemand { required_m, requested_n: None, requested_m: None }
    }

    #[test]
    fn test_intersect_ranges() {
        let first = vec![(0, 9), (15, 30)];
        let second = vec![(5, 20), (25, 39)];

        assert_eq!(intersect_ranges(&first, &second), vec![(5, 9), (15, 20), (25, 30)]);
    }

    #[test]
    fn test_first_fit_on_common_range() {
        let band = Bitmap::with_bounds(0, 40, 2, GRID).unwrap();
        let mut list = oms_list(2);
        assert!(list[0].assign_spectrum(4, 4));
        assert!(list[1].assign_spectrum(12, 2));

        let mut orchestrator = SpectrumOrchestrator::new(&mut list, &band);
        let assignment = orchestrator.assign(&[0, 1], &demand(4)).unwrap().unwrap();

        // free on both: [8, 9] and [14, 39]
        assert_eq!((assignment.n, assignment.m), (18, 4));
        assert!(list[0].spectrum_bitmap().is_occupied(14).unwrap());
        assert!(list[1].spectrum_bitmap().is_occupied(21).unwrap());
        assert!(!list[1].spectrum_bitmap().is_occupied(22).unwrap());
    }

    #[test]
    fn test_requested_n_is_validated() {
        let band = Bitmap::with_bounds(0, 40, 2, GRID).unwrap();
        let mut list = oms_list(1);
        assert!(list[0].assign_spectrum(10, 2));

        let mut orchestrator = SpectrumOrchestrator::new(&mut list, &band);
        let taken = SlotDemand { required_m: 2, requested_n: Some(11), requested_m: None };
        let free = SlotDemand { required_m: 2, requested_n: Some(30), requested_m: Some(3) };

        assert!(matches!(orchestrator.assign(&[0], &taken).unwrap(), Err(BlockingReason::SpectrumAssignmentError(_))));
        assert_eq!(orchestrator.assign(&[0], &free).unwrap().unwrap(), SpectrumAssignment::new(30, 3));
    }

    #[test]
    fn test_requested_m_below_required() {
        let result = SpectrumOrchestrator::select_slot(&[(0, 39)], &SlotDemand { required_m: 4, requested_n: None, requested_m: Some(2) });

        assert!(matches!(result, Err(BlockingReason::SpectrumAssignmentError(_))));
    }

    #[test]
    fn test_no_common_space() {
        let band = Bitmap::with_bounds(0, 40, 2, GRID).unwrap();
        let mut list = oms_list(2);
        assert!(list[0].assign_spectrum(10, 10));
        assert!(list[1].assign_spectrum(30, 10));

        let mut orchestrator = SpectrumOrchestrator::new(&mut list, &band);
        let result = orchestrator.assign(&[0, 1], &demand(1)).unwrap();

        assert!(matches!(result, Err(BlockingReason::SpectrumAssignmentError(_))));
        assert_eq!(list[0].spectrum_bitmap().occupied_count(), 20);
        assert_eq!(list[1].spectrum_bitmap().occupied_count(), 20);
    }

    #[test]
    fn test_rejection_rolls_back_applied_oms() {
        let band = Bitmap::with_bounds(0, 40, 2, GRID).unwrap();
        let mut list = oms_list(2);
        assert!(list[1].assign_spectrum(30, 2));
        let before: Vec<Bitmap> = list.iter().map(|oms| oms.spectrum_bitmap().clone()).collect();

        // OMS 1 listed twice: its second assignment is rejected after 0 and 1 accepted
        let mut orchestrator = SpectrumOrchestrator::new(&mut list, &band);
        let result = orchestrator.assign(&[0, 1, 1], &demand(2)).unwrap();

        assert!(matches!(result, Err(BlockingReason::SpectrumAssignmentError(_))));
        let after: Vec<Bitmap> = list.iter().map(|oms| oms.spectrum_bitmap().clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_extreme_requested_values_block_the_request() {
        let ranges = vec![(0, 39)];
        let huge_m = SlotDemand { required_m: 4, requested_n: None, requested_m: Some(i64::MAX / 2 + 1) };
        let huge_n = SlotDemand { required_m: 4, requested_n: Some(i64::MAX), requested_m: None };
        let tiny_n = SlotDemand { required_m: 4, requested_n: Some(i64::MIN), requested_m: None };
        let both = SlotDemand { required_m: 4, requested_n: Some(i64::MAX), requested_m: Some(i64::MAX) };

        for demand in [huge_m, huge_n, tiny_n, both] {
            let result = SpectrumOrchestrator::select_slot(&ranges, &demand);
            assert!(matches!(result, Err(BlockingReason::SpectrumAssignmentError(_))), "unexpected {:?} for {:?}", result, demand);
        }
    }

    #[test]
    fn test_unknown_oms_is_fatal() {
        let band = Bitmap::with_bounds(0, 40, 2, GRID).unwrap();
        let mut list = oms_list(1);
        let mut orchestrator = SpectrumOrchestrator::new(&mut list, &band);

        assert!(matches!(orchestrator.assign(&[3], &demand(1)), Err(Error::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_path_without_oms_uses_band() {
        let band = Bitmap::with_bounds(0, 40, 2, GRID).unwrap();
        let mut list = oms_list(0);
        let mut orchestrator = SpectrumOrchestrator::new(&mut list, &band);

        let assignment = orchestrator.assign(&[], &demand(2)).unwrap().unwrap();

        assert_eq!((assignment.n, assignment.m), (2, 2));
    }
}
