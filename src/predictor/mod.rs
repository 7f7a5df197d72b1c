//! Hybrid 2Bc-gskew-pskew conditional branch predictor
//!
//! The top-level selector chooses between 2Bc-gskew (itself a selector over
//! e-gskew and bimodal) and e-pskew, a skewed predictor keyed by per-branch
//! local history. Reference:
//! <https://hal.inria.fr/inria-00073060/document>

pub mod bimodal;
pub mod history;
pub mod policy;
pub mod skew;
pub mod skewed;
pub mod static_bp;
pub mod tournament;

use log::debug;
use log::trace;

use crate::trace::OpType;
use bimodal::BimodalPredictor;
use history::GlobalHistory;
use history::LocalHistoryTable;
use policy::PredictorPolicy;
use skew::SkewFields;
use skewed::BankIndices;
use skewed::SkewedPredictor;
use tournament::Selection;
use tournament::TournamentSelector;

/// Entry points a trace-replay harness drives
///
/// For every conditional branch `predict` is called, the branch resolves,
/// and `update` is called with the value `predict` returned before the
/// next branch is queried.
pub trait ConditionalBranchPredictor {
    /// Predicts the direction of the branch at `pc` without changing state
    fn predict(&self, pc: u32) -> bool;

    /// Trains the predictor with the resolved direction of the branch at `pc`
    fn update(
        &mut self,
        pc: u32,
        resolved: bool,
        predicted: bool,
        branch_target: u32,
    );

    /// Called for every instruction that is not a conditional branch
    fn track_other_instruction(
        &mut self,
        _pc: u32,
        _op_type: OpType,
        _branch_target: u32,
    ) {
    }

    fn name(&self) -> &'static str;
}

/// Which component supplied a final prediction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Gskew,
    Bimodal,
    Pskew,
}

/// History module
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PredictorHistory {
    pub gskew_provided: u64,
    pub bimodal_provided: u64,
    pub pskew_provided: u64,

    pub tour1_updates: u64,
    pub tour2_updates: u64,
    pub gskew_updates: u64,
    pub pskew_updates: u64,
}

impl Provider {
    fn from_selections(tour2: Selection, tour1: Selection) -> Self {
        match (tour2, tour1) {
            (Selection::Alternate, _) => Provider::Pskew,
            (Selection::Primary, Selection::Primary) => Provider::Gskew,
            (Selection::Primary, Selection::Alternate) => Provider::Bimodal,
        }
    }
}

impl PredictorHistory {
    fn record_provider(&mut self, provider: Provider) {
        match provider {
            Provider::Gskew => self.gskew_provided += 1,
            Provider::Bimodal => self.bimodal_provided += 1,
            Provider::Pskew => self.pskew_provided += 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HybridPredictor {
    policy: PredictorPolicy,

    ghr: GlobalHistory,
    bht: LocalHistoryTable,

    bimodal: BimodalPredictor,
    gskew: SkewedPredictor,
    pskew: SkewedPredictor,

    /// Chooses e-gskew (primary) or bimodal
    tour1: TournamentSelector,
    /// Chooses 2Bc-gskew (primary) or e-pskew
    tour2: TournamentSelector,

    pub history: PredictorHistory,
}

impl Default for HybridPredictor {
    fn default() -> Self {
        Self::make(PredictorPolicy::default())
    }
}

impl HybridPredictor {
    pub fn make(policy: PredictorPolicy) -> Self {
        assert!(policy.is_valid());

        let predictor = Self {
            policy,
            ghr: GlobalHistory::new(policy.history_length),
            bht: LocalHistoryTable::new(
                policy.bht_idx_length,
                policy.local_history_length,
            ),
            bimodal: BimodalPredictor::new(
                policy.bimodal_idx_length,
                policy.pht_counter_max,
                policy.pht_counter_init,
            ),
            gskew: SkewedPredictor::new(
                policy.pht_idx_length,
                policy.pht_counter_max,
                policy.pht_counter_init,
            ),
            pskew: SkewedPredictor::new(
                policy.local_pht_idx_length,
                policy.pht_counter_max,
                policy.pht_counter_init,
            ),
            tour1: TournamentSelector::new(
                policy.tour1_idx_length,
                policy.tour_counter_max,
                policy.tour1_init(),
            ),
            tour2: TournamentSelector::new(
                policy.tour2_idx_length,
                policy.tour_counter_max,
                policy.tour2_init(),
            ),
            history: PredictorHistory::default(),
        };

        debug!(
            "hybrid predictor: {} bimodal, {} gskew, {} pskew, {} tour1, \
             {} tour2, {} BHT entries; {} bits of storage",
            predictor.bimodal.num_entries(),
            predictor.gskew.num_entries(),
            predictor.pskew.num_entries(),
            predictor.tour1.num_entries(),
            predictor.tour2.num_entries(),
            predictor.bht.num_entries(),
            policy.storage_bits()
        );

        predictor
    }

    fn global_fields(&self, pc: u32, idx_length: usize) -> SkewFields {
        SkewFields::construct(
            pc,
            self.ghr.read(),
            self.ghr.length() as u32,
            idx_length as u32,
        )
    }

    fn local_fields(&self, pc: u32) -> SkewFields {
        SkewFields::construct(
            pc,
            self.bht.read(pc),
            self.bht.length() as u32,
            self.policy.local_pht_idx_length as u32,
        )
    }

    fn tour1_index(&self, pc: u32) -> usize {
        let idx_length = self.policy.tour1_idx_length;
        self.global_fields(pc, idx_length).chooser(idx_length as u32)
    }

    fn gskew_indices(&self, pc: u32) -> BankIndices {
        let fields = self.global_fields(pc, self.policy.pht_idx_length);
        self.gskew.indices(&fields)
    }

    pub fn bimodal_prediction(&self, pc: u32) -> bool {
        self.bimodal.predict(pc)
    }

    pub fn gskew_prediction(&self, pc: u32) -> bool {
        self.gskew
            .predict(self.gskew_indices(pc), self.bimodal_prediction(pc))
    }

    pub fn pskew_prediction(&self, pc: u32) -> bool {
        let at = self.pskew.indices(&self.local_fields(pc));
        self.pskew.predict(at, self.bimodal_prediction(pc))
    }

    /// Prediction of e-gskew or bimodal, whichever the first selector picks
    pub fn bc_gskew_prediction(&self, pc: u32) -> bool {
        match self.tour1.select(self.tour1_index(pc)) {
            Selection::Primary => self.gskew_prediction(pc),
            Selection::Alternate => self.bimodal_prediction(pc),
        }
    }

    /// Component the current state would take the prediction for `pc` from
    #[cfg(test)]
    pub(crate) fn provider(&self, pc: u32) -> Provider {
        let tour2_index = self.tour2.direct_index(pc);
        Provider::from_selections(
            self.tour2.select(tour2_index),
            self.tour1.select(self.tour1_index(pc)),
        )
    }
}

impl ConditionalBranchPredictor for HybridPredictor {
    fn predict(&self, pc: u32) -> bool {
        let tour2_index = self.tour2.direct_index(pc);
        match self.tour2.select(tour2_index) {
            Selection::Primary => self.bc_gskew_prediction(pc),
            Selection::Alternate => self.pskew_prediction(pc),
        }
    }

    fn update(
        &mut self,
        pc: u32,
        resolved: bool,
        predicted: bool,
        _branch_target: u32,
    ) {
        let mispredicted = predicted != resolved;

        // Every decision below is taken from the state before this update
        let tour2_index = self.tour2.direct_index(pc);
        let tour2_selection = self.tour2.select(tour2_index);
        let tour1_index = self.tour1_index(pc);
        let tour1_selection = self.tour1.select(tour1_index);
        let bc_gskew_selected = tour2_selection == Selection::Primary;
        let gskew_selected = tour1_selection == Selection::Primary;

        let gskew_at = self.gskew_indices(pc);
        let pskew_at = BankIndices::at_width(
            &self.local_fields(pc),
            self.policy.local_update_idx_length(),
        );

        let bimodal_pred = self.bimodal_prediction(pc);
        let gskew_pred = self.gskew_prediction(pc);
        let pskew_pred = self.pskew_prediction(pc);
        let bc_gskew_pred = if gskew_selected {
            gskew_pred
        } else {
            bimodal_pred
        };

        let provider =
            Provider::from_selections(tour2_selection, tour1_selection);
        self.history.record_provider(provider);
        if mispredicted {
            trace!(
                "mispredict at {:#010x}: resolved={} bimodal={} gskew={} \
                 pskew={} 2bc-gskew={}",
                pc,
                resolved,
                bimodal_pred,
                gskew_pred,
                pskew_pred,
                bc_gskew_pred
            );
        }

        if bc_gskew_pred != pskew_pred {
            let winner = if pskew_pred == resolved {
                Selection::Alternate
            } else {
                Selection::Primary
            };
            self.tour2.train(tour2_index, winner);
            self.history.tour2_updates += 1;
        }

        if bc_gskew_selected && gskew_pred != bimodal_pred {
            let winner = if bimodal_pred == resolved {
                Selection::Alternate
            } else {
                Selection::Primary
            };
            self.tour1.train(tour1_index, winner);
            self.history.tour1_updates += 1;
        }

        if mispredicted || (bc_gskew_selected && gskew_selected) {
            self.gskew.update(gskew_at, gskew_pred, resolved);
            self.history.gskew_updates += 1;
        }

        if mispredicted || !bc_gskew_selected {
            self.pskew.update(pskew_at, pskew_pred, resolved);
            self.history.pskew_updates += 1;
        }

        self.bimodal.update(pc, resolved, mispredicted);

        self.ghr.push(resolved);
        self.bht.push(pc, resolved);
    }

    fn name(&self) -> &'static str {
        "2Bc-gskew-pskew"
    }
}

#[cfg(test)]
mod tests {
    use super::policy::LocalUpdateWidth;
    use super::*;
    use pretty_assertions::assert_eq;

    const PCS: [u32; 8] = [
        0x0000_0000,
        0x0000_0001,
        0x0040_1000,
        0x0040_1004,
        0x1234_5678,
        0x8000_0000,
        0xdead_beef,
        0xffff_ffff,
    ];

    /// Replays `pattern` at `pc` and returns the per-branch mispredictions
    fn run_pattern(
        predictor: &mut HybridPredictor,
        pc: u32,
        pattern: impl Fn(usize) -> bool,
        n: usize,
    ) -> Vec<bool> {
        (0..n)
            .map(|i| {
                let resolved = pattern(i);
                let predicted = predictor.predict(pc);
                predictor.update(pc, resolved, predicted, pc.wrapping_add(8));
                predicted != resolved
            })
            .collect()
    }

    #[test]
    fn test_cold_start_predicts_taken() {
        let predictor = HybridPredictor::default();
        for pc in PCS {
            assert!(predictor.predict(pc));
            assert!(predictor.bimodal_prediction(pc));
            assert!(predictor.gskew_prediction(pc));
            assert!(predictor.pskew_prediction(pc));
            assert_eq!(predictor.provider(pc), Provider::Bimodal);
        }
    }

    #[test]
    fn test_predict_is_pure() {
        let mut predictor = HybridPredictor::default();
        run_pattern(&mut predictor, 0x400, |i| i % 3 == 0, 50);

        let before = predictor.history;
        for pc in PCS {
            assert_eq!(predictor.predict(pc), predictor.predict(pc));
        }
        assert_eq!(predictor.history, before);
    }

    #[test]
    fn test_converges_to_taken() {
        let mut predictor = HybridPredictor::default();
        run_pattern(&mut predictor, 0x4000, |_| true, 16);
        assert!(predictor.predict(0x4000));

        let misses = run_pattern(&mut predictor, 0x4000, |_| true, 64);
        assert!(misses.iter().all(|miss| !miss));
    }

    #[test]
    fn test_converges_to_not_taken() {
        let mut predictor = HybridPredictor::default();
        run_pattern(&mut predictor, 0x4000, |_| false, 16);
        assert!(!predictor.predict(0x4000));

        let misses = run_pattern(&mut predictor, 0x4000, |_| false, 64);
        assert!(misses.iter().all(|miss| !miss));
    }

    #[test]
    fn test_first_not_taken_trains_every_table() {
        let mut predictor = HybridPredictor::default();
        let pc = 0x4000;
        let predicted = predictor.predict(pc);
        predictor.update(pc, false, predicted, 0);

        // The history stays zero, so the same entries are read back
        let (g1, g2) = predictor.gskew.counters(predictor.gskew_indices(pc));
        let local_at = predictor.pskew.indices(&predictor.local_fields(pc));
        let (p1, p2) = predictor.pskew.counters(local_at);
        assert_eq!((g1, g2, p1, p2), (1, 1, 1, 1));
        assert_eq!(predictor.bimodal.counter(pc), 1);
        assert_eq!(
            predictor.history,
            PredictorHistory {
                bimodal_provided: 1,
                gskew_updates: 1,
                pskew_updates: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_learns_alternating_pattern() {
        let mut predictor = HybridPredictor::default();
        run_pattern(&mut predictor, 0x1000, |i| i % 2 == 0, 200);
        let misses = run_pattern(&mut predictor, 0x1000, |i| i % 2 == 0, 200);
        assert_eq!(misses.iter().filter(|miss| **miss).count(), 0);
    }

    #[test]
    fn test_learns_loop_exit() {
        let mut predictor = HybridPredictor::default();
        run_pattern(&mut predictor, 0x2040, |i| i % 8 != 7, 400);
        let misses = run_pattern(&mut predictor, 0x2040, |i| i % 8 != 7, 400);
        assert_eq!(misses.iter().filter(|miss| **miss).count(), 0);
    }

    #[test]
    fn test_history_overflow_does_not_change_predictions() {
        let mut predictor = HybridPredictor::default();
        for (k, pc) in PCS.iter().enumerate() {
            run_pattern(&mut predictor, *pc, |i| (i + k) % 3 != 0, 40);
        }

        let mut flipped = predictor.clone();
        flipped.ghr.set_raw(predictor.ghr.raw() ^ 0xffe0_0000);
        for pc in PCS {
            let local = predictor.bht.read(pc);
            flipped.bht.set_raw(pc, local | 0xabc0_0000);
        }

        for pc in PCS {
            assert_eq!(predictor.predict(pc), flipped.predict(pc));
            assert_eq!(predictor.provider(pc), flipped.provider(pc));
        }

        for pc in PCS {
            let a = predictor.predict(pc);
            let b = flipped.predict(pc);
            predictor.update(pc, !a, a, 0);
            flipped.update(pc, !b, b, 0);
        }
        for pc in PCS {
            assert_eq!(predictor.predict(pc), flipped.predict(pc));
        }
    }

    #[test]
    fn test_other_instructions_leave_state_untouched() {
        let mut predictor = HybridPredictor::default();
        run_pattern(&mut predictor, 0x400, |i| i % 2 == 0, 30);
        let before: Vec<bool> =
            PCS.iter().map(|pc| predictor.predict(*pc)).collect();
        let history = predictor.history;
        let ghr = predictor.ghr.raw();

        predictor.track_other_instruction(0x404, OpType::Load, 0);
        predictor.track_other_instruction(0x408, OpType::Call, 0x2000);

        let after: Vec<bool> =
            PCS.iter().map(|pc| predictor.predict(*pc)).collect();
        assert_eq!(before, after);
        assert_eq!(predictor.history, history);
        assert_eq!(predictor.ghr.raw(), ghr);
    }

    #[test]
    fn test_local_width_fix_keeps_indices_consistent() {
        let policy = PredictorPolicy {
            local_pht_idx_length: 16,
            local_update_width: LocalUpdateWidth::LocalPht,
            ..Default::default()
        };
        let mut predictor = HybridPredictor::make(policy);
        run_pattern(&mut predictor, 0x8000, |_| false, 16);
        assert!(!predictor.predict(0x8000));
        assert!(!predictor.pskew_prediction(0x8000));
    }

    const GATE_PC: u32 = 0x4000;

    /// Sets the selector counters for `GATE_PC`; the histories are empty
    fn gated_predictor(tour2: u8, tour1: u8) -> HybridPredictor {
        let mut predictor = HybridPredictor::default();
        let tour2_index = predictor.tour2.direct_index(GATE_PC);
        let tour1_index = predictor.tour1_index(GATE_PC);
        predictor.tour2.set_counter(tour2_index, tour2);
        predictor.tour1.set_counter(tour1_index, tour1);
        predictor
    }

    fn gskew_counters(predictor: &HybridPredictor) -> (u8, u8) {
        predictor.gskew.counters(predictor.gskew_indices(GATE_PC))
    }

    fn set_gskew(predictor: &mut HybridPredictor, first: u8, second: u8) {
        let at = predictor.gskew_indices(GATE_PC);
        predictor.gskew.set_counters(at, first, second);
    }

    fn pskew_counters(predictor: &HybridPredictor) -> (u8, u8) {
        let at = predictor.pskew.indices(&predictor.local_fields(GATE_PC));
        predictor.pskew.counters(at)
    }

    fn set_pskew(predictor: &mut HybridPredictor, first: u8, second: u8) {
        let at = predictor.pskew.indices(&predictor.local_fields(GATE_PC));
        predictor.pskew.set_counters(at, first, second);
    }

    fn resolve(predictor: &mut HybridPredictor, resolved: bool) {
        let predicted = predictor.predict(GATE_PC);
        predictor.update(GATE_PC, resolved, predicted, 0);

        // Rewind the histories so the same entries are read back
        predictor.ghr.set_raw(0);
        predictor.bht.set_raw(GATE_PC, 0);
    }

    #[test]
    fn test_tour1_frozen_while_pskew_selected() {
        let mut predictor = gated_predictor(3, 2);
        // e-gskew votes not-taken against a taken bimodal
        set_gskew(&mut predictor, 0, 0);
        assert!(!predictor.gskew_prediction(GATE_PC));
        assert!(predictor.bimodal_prediction(GATE_PC));
        assert_eq!(predictor.provider(GATE_PC), Provider::Pskew);

        resolve(&mut predictor, true);

        let tour1_index = predictor.tour1_index(GATE_PC);
        assert_eq!(predictor.tour1.counter(tour1_index), 2);
        assert_eq!(gskew_counters(&predictor), (0, 0));
        assert_eq!(pskew_counters(&predictor), (3, 3));
        assert_eq!(
            predictor.history,
            PredictorHistory {
                pskew_provided: 1,
                pskew_updates: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_tour1_trains_when_gskew_and_bimodal_disagree() {
        let mut predictor = gated_predictor(1, 2);
        set_gskew(&mut predictor, 0, 0);

        resolve(&mut predictor, false);

        // e-gskew was right, so the chooser moves toward it
        let tour1_index = predictor.tour1_index(GATE_PC);
        assert_eq!(predictor.tour1.counter(tour1_index), 1);
        assert_eq!(
            predictor.history,
            PredictorHistory {
                bimodal_provided: 1,
                tour1_updates: 1,
                gskew_updates: 1,
                pskew_updates: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_gskew_frozen_on_correct_bimodal_pick() {
        let mut predictor = gated_predictor(1, 2);
        set_gskew(&mut predictor, 2, 1);
        assert_eq!(predictor.provider(GATE_PC), Provider::Bimodal);

        resolve(&mut predictor, true);

        assert_eq!(gskew_counters(&predictor), (2, 1));
        assert_eq!(pskew_counters(&predictor), (2, 2));
        assert_eq!(
            predictor.history,
            PredictorHistory {
                bimodal_provided: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_gskew_frozen_on_correct_pskew_pick() {
        // tour1 favors e-gskew, but tour2 hands the branch to e-pskew
        let mut predictor = gated_predictor(3, 0);
        set_gskew(&mut predictor, 2, 1);
        assert_eq!(predictor.provider(GATE_PC), Provider::Pskew);

        resolve(&mut predictor, true);

        assert_eq!(gskew_counters(&predictor), (2, 1));
        assert_eq!(pskew_counters(&predictor), (3, 3));
        assert_eq!(
            predictor.history,
            PredictorHistory {
                pskew_provided: 1,
                pskew_updates: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_pskew_frozen_on_correct_bc_gskew_pick() {
        let mut predictor = gated_predictor(1, 0);
        set_pskew(&mut predictor, 2, 1);
        assert!(predictor.pskew_prediction(GATE_PC));
        assert_eq!(predictor.provider(GATE_PC), Provider::Gskew);

        resolve(&mut predictor, true);

        assert_eq!(pskew_counters(&predictor), (2, 1));
        assert_eq!(gskew_counters(&predictor), (3, 3));
        assert_eq!(
            predictor.history,
            PredictorHistory {
                gskew_provided: 1,
                gskew_updates: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_tour2_frozen_when_components_agree() {
        let mut predictor = gated_predictor(1, 2);

        // Both sides predict taken and both are wrong
        resolve(&mut predictor, false);

        let tour2_index = predictor.tour2.direct_index(GATE_PC);
        assert_eq!(predictor.tour2.counter(tour2_index), 1);
        assert_eq!(predictor.history.tour2_updates, 0);
    }

    #[test]
    fn test_tour2_trains_toward_correct_pskew() {
        let mut predictor = gated_predictor(1, 2);
        set_pskew(&mut predictor, 0, 0);
        assert!(!predictor.pskew_prediction(GATE_PC));
        assert!(predictor.bc_gskew_prediction(GATE_PC));

        resolve(&mut predictor, false);

        let tour2_index = predictor.tour2.direct_index(GATE_PC);
        assert_eq!(predictor.tour2.counter(tour2_index), 2);
        assert_eq!(gskew_counters(&predictor), (1, 1));
        assert_eq!(pskew_counters(&predictor), (0, 0));
        assert_eq!(
            predictor.history,
            PredictorHistory {
                bimodal_provided: 1,
                tour2_updates: 1,
                gskew_updates: 1,
                pskew_updates: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_correct_gskew_leaves_dissenting_bank() {
        let mut predictor = gated_predictor(1, 0);
        // First bank dissents, second bank and bimodal carry the vote
        set_gskew(&mut predictor, 1, 2);
        assert!(predictor.gskew_prediction(GATE_PC));
        assert_eq!(predictor.provider(GATE_PC), Provider::Gskew);

        resolve(&mut predictor, true);

        assert_eq!(gskew_counters(&predictor), (1, 3));
        assert_eq!(predictor.history.gskew_updates, 1);
    }

    #[test]
    #[should_panic]
    fn test_invalid_policy_panics() {
        HybridPredictor::make(PredictorPolicy {
            bht_idx_length: 40,
            ..Default::default()
        });
    }
}
