//! Always-not-taken baseline

use super::ConditionalBranchPredictor;

/// Predicts every branch not-taken and never learns
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPredictor;

impl ConditionalBranchPredictor for StaticPredictor {
    fn predict(&self, _pc: u32) -> bool {
        false
    }

    fn update(
        &mut self,
        _pc: u32,
        _resolved: bool,
        _predicted: bool,
        _branch_target: u32,
    ) {
        // Do nothing
    }

    fn name(&self) -> &'static str {
        "always-not-taken"
    }
}
