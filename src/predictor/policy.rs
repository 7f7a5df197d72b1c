//! Predictor geometry and counter configuration

use crate::counter::counter_bits;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;

/// Index width used when the update path addresses the local banks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocalUpdateWidth {
    /// Hash local bank indices with `pht_idx_length`, as the tuned
    /// reference predictor does
    #[default]
    GlobalPht,
    /// Hash local bank indices with `local_pht_idx_length`, matching
    /// the prediction path
    LocalPht,
}

/// Predictor policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictorPolicy {
    /// Meaningful bits of the global history register
    pub history_length: usize,
    /// Meaningful bits of each local history register
    pub local_history_length: usize,

    pub pht_idx_length: usize,
    pub local_pht_idx_length: usize,
    pub bimodal_idx_length: usize,
    pub bht_idx_length: usize,
    pub tour1_idx_length: usize,
    pub tour2_idx_length: usize,

    /// Saturation bound of pattern and bimodal counters
    pub pht_counter_max: u8,
    /// Initial value of pattern and bimodal counters
    pub pht_counter_init: u8,
    /// Saturation bound of tournament counters
    pub tour_counter_max: u8,

    pub local_update_width: LocalUpdateWidth,
}

impl Default for PredictorPolicy {
    /// 2Bc-gskew-pskew hybrid fitting a 62.5KB counter budget
    fn default() -> Self {
        Self {
            history_length: 21,
            local_history_length: 21,
            pht_idx_length: 15,
            local_pht_idx_length: 15,
            bimodal_idx_length: 15,
            bht_idx_length: 12,
            tour1_idx_length: 15,
            tour2_idx_length: 14,
            pht_counter_max: 3,
            pht_counter_init: 2,
            tour_counter_max: 3,
            local_update_width: LocalUpdateWidth::GlobalPht,
        }
    }
}

impl PredictorPolicy {
    /// Same layout with every table halved
    pub fn half_size() -> Self {
        let base = Self::default();
        Self {
            pht_idx_length: base.pht_idx_length - 1,
            local_pht_idx_length: base.local_pht_idx_length - 1,
            bimodal_idx_length: base.bimodal_idx_length - 1,
            bht_idx_length: base.bht_idx_length - 1,
            tour1_idx_length: base.tour1_idx_length - 1,
            tour2_idx_length: base.tour2_idx_length - 1,
            ..base
        }
    }

    /// Initial value of the gskew/bimodal chooser, biased toward bimodal
    pub fn tour1_init(&self) -> u8 {
        self.tour_counter_max / 2 + 1
    }

    /// Initial value of the top-level chooser, selecting 2Bc-gskew
    pub fn tour2_init(&self) -> u8 {
        self.tour_counter_max / 2
    }

    /// Width the update path hashes local bank indices with
    pub fn local_update_idx_length(&self) -> usize {
        match self.local_update_width {
            LocalUpdateWidth::GlobalPht => self.pht_idx_length,
            LocalUpdateWidth::LocalPht => self.local_pht_idx_length,
        }
    }

    pub fn validate(&self) -> SimulatorResult<()> {
        let idx_lengths = [
            ("pht_idx_length", self.pht_idx_length),
            ("local_pht_idx_length", self.local_pht_idx_length),
            ("bimodal_idx_length", self.bimodal_idx_length),
            ("bht_idx_length", self.bht_idx_length),
            ("tour1_idx_length", self.tour1_idx_length),
            ("tour2_idx_length", self.tour2_idx_length),
        ];
        for (name, length) in idx_lengths {
            // Skewed hashing needs at least two bits, and both
            // fields of the folded vector must fit in 32 bits
            if !(2..=16).contains(&length) {
                return Err(SimulatorError::ConfigError(format!(
                    "{} must be in 2..=16, got {}",
                    name, length
                )));
            }
        }

        let history_lengths = [
            ("history_length", self.history_length),
            ("local_history_length", self.local_history_length),
        ];
        for (name, length) in history_lengths {
            if !(1..=31).contains(&length) {
                return Err(SimulatorError::ConfigError(format!(
                    "{} must be in 1..=31, got {}",
                    name, length
                )));
            }
        }

        if self.pht_counter_max == 0 || self.tour_counter_max == 0 {
            return Err(SimulatorError::ConfigError(
                "counter maxima must be positive".to_string(),
            ));
        }
        if self.pht_counter_init > self.pht_counter_max {
            return Err(SimulatorError::ConfigError(format!(
                "pht_counter_init {} exceeds pht_counter_max {}",
                self.pht_counter_init, self.pht_counter_max
            )));
        }

        // Indices hashed at a narrower width than the local banks
        // stay in range; a wider width could overrun them
        if self.local_update_idx_length() > self.local_pht_idx_length {
            return Err(SimulatorError::ConfigError(format!(
                "local update width {} exceeds local_pht_idx_length {}",
                self.local_update_idx_length(),
                self.local_pht_idx_length
            )));
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Total counter and history register storage in bits
    pub fn storage_bits(&self) -> usize {
        let pht_bits = counter_bits(self.pht_counter_max);
        let tour_bits = counter_bits(self.tour_counter_max);

        let bimodal = (1 << self.bimodal_idx_length) * pht_bits;
        let gskew = 2 * (1 << self.pht_idx_length) * pht_bits;
        let pskew = 2 * (1 << self.local_pht_idx_length) * pht_bits;
        let tour1 = (1 << self.tour1_idx_length) * tour_bits;
        let tour2 = (1 << self.tour2_idx_length) * tour_bits;
        let bht = (1 << self.bht_idx_length) * self.local_history_length;

        bimodal + gskew + pskew + tour1 + tour2 + bht + self.history_length
    }
}
