use crate::domain::spectrum::bitmap::Bitmap;
use crate::domain::topology::graph::ElementKey;
use crate::domain::utils::id::{ElementId, OmsId};
use crate::error::Result;

/// Optical Multiplex Section: the element chain between two switches, endpoints included.
///
/// The OMS is the unit of spectrum bookkeeping and the only owner of its bitmap. All
/// occupancy changes go through the bitmap's assign/release operations.
#[derive(Debug, Clone)]
pub struct Oms {
    pub oms_id: OmsId,

    pub el_id_list: Vec<ElementId>,

    pub el_list: Vec<ElementKey>,

    /// OMS carrying the opposite direction between the same two switches, if found.
    pub reversed_oms: Option<OmsId>,

    spectrum_bitmap: Bitmap,
}

impl Oms {
    pub fn new(oms_id: OmsId, spectrum_bitmap: Bitmap) -> Self {
        Self { oms_id, el_id_list: Vec::new(), el_list: Vec::new(), reversed_oms: None, spectrum_bitmap }
    }

    pub fn add_element(&mut self, key: ElementKey, id: ElementId) {
        self.el_list.push(key);
        self.el_id_list.push(id);
    }

    pub fn len(&self) -> usize {
        self.el_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.el_list.is_empty()
    }

    /// Switch the OMS starts at.
    pub fn first(&self) -> Option<ElementKey> {
        self.el_list.first().copied()
    }

    /// Switch the OMS ends at.
    pub fn last(&self) -> Option<ElementKey> {
        self.el_list.last().copied()
    }

    /// Consecutive element pairs, i.e. the unidirectional links of the section.
    pub fn links(&self) -> impl Iterator<Item = (ElementKey, ElementKey)> + '_ {
        self.el_list.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn spectrum_bitmap(&self) -> &Bitmap {
        &self.spectrum_bitmap
    }

    pub fn assign_spectrum(&mut self, nvalue: i64, mvalue: i64) -> bool {
        let assigned = self.spectrum_bitmap.assign_spectrum(nvalue, mvalue);
        if assigned {
            log::trace!("OMS {} assigned n={} m={}.", self.oms_id, nvalue, mvalue);
        }
        assigned
    }

    pub fn release_spectrum(&mut self, nvalue: i64, mvalue: i64) -> bool {
        self.spectrum_bitmap.release_spectrum(nvalue, mvalue)
    }

    pub fn update_spectrum(&mut self, freq_min: f64, freq_max: f64, grid: f64, guardband: f64) -> Result<()> {
        self.spectrum_bitmap.update_spectrum(freq_min, freq_max, grid, guardband)
    }

    /// Widens the usable band to `[freq_index_min, freq_index_max]`, keeping the
    /// current guardband and grid.
    pub(crate) fn widen_spectrum(&mut self, freq_index_min: i64, freq_index_max: i64) -> Result<()> {
        let guardband = self.spectrum_bitmap.guardband();
        let grid = self.spectrum_bitmap.grid();
        self.spectrum_bitmap.set_bounds(freq_index_min, freq_index_max, guardband, grid)
    }
}
