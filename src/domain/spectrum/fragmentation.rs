use crate::domain::spectrum::bitmap::Bitmap;

const FRAGMENTATION_POWER: f64 = 2.0;

impl Bitmap {
    /// Computes the **Fragmentation Index** of the usable band using the **Quadratic Mean**
    /// of the free block lengths.
    ///
    /// `1 - Σ len² / (Σ len)²` over all maximal free blocks. A single contiguous free block
    /// gives **0.0**; many small scattered blocks push the value towards **1.0**.
    ///
    /// # Returns
    /// **0.0** when the band has no free cell at all.
    pub fn fragmentation(&self) -> f64 {
        let mut quad_sum_per_free_block: f64 = 0.0;
        let mut sum_per_free_block: f64 = 0.0;

        for (start_n, stop_n) in self.free_ranges() {
            let block_len = (stop_n - start_n + 1) as f64;
            quad_sum_per_free_block += block_len.powf(FRAGMENTATION_POWER);
            sum_per_free_block += block_len;
        }

        // No free block
        if sum_per_free_block == 0.0 {
            return 0.0;
        }

        1.0 - quad_sum_per_free_block / sum_per_free_block.powf(FRAGMENTATION_POWER)
    }
}
