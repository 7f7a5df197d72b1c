//! A trace replay wrapper

use log::info;

use crate::error::SimulatorResult;
use crate::predictor::ConditionalBranchPredictor;
use crate::trace;
use crate::trace::TraceRecord;

/// Outcome counts of one replay
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct RunStats {
    pub instructions: u64,
    pub branches: u64,
    pub mispredictions: u64,
}

impl RunStats {
    /// Fraction of conditional branches predicted correctly
    pub fn accuracy(&self) -> f64 {
        if self.branches == 0 {
            return 1.0;
        }
        1.0 - self.mispredict_rate()
    }

    pub fn mispredict_rate(&self) -> f64 {
        if self.branches == 0 {
            return 0.0;
        }
        self.mispredictions as f64 / self.branches as f64
    }

    /// Mispredictions per thousand instructions
    pub fn mpki(&self) -> f64 {
        if self.instructions == 0 {
            return 0.0;
        }
        1000.0 * self.mispredictions as f64 / self.instructions as f64
    }
}

/// Drive `predictor` through `records` in order
pub fn replay(
    predictor: &mut impl ConditionalBranchPredictor,
    records: &[TraceRecord],
) -> RunStats {
    let mut stats = RunStats::default();

    for record in records {
        stats.instructions += 1;
        match *record {
            TraceRecord::Branch { pc, taken, target } => {
                let predicted = predictor.predict(pc);
                predictor.update(pc, taken, predicted, target);

                stats.branches += 1;
                if predicted != taken {
                    stats.mispredictions += 1;
                }
            }
            TraceRecord::Other {
                pc,
                op_type,
                target,
            } => {
                predictor.track_other_instruction(pc, op_type, target);
            }
        }
    }

    stats
}

/// Run the predictor on the given trace file
pub fn run_trace(
    predictor: &mut impl ConditionalBranchPredictor,
    trace_path: &str,
) -> SimulatorResult<RunStats> {
    let records = trace::fetch_records(trace_path)?;
    let stats = replay(predictor, &records);

    info!(
        "{}: {} on {} branches / {} instructions: {} mispredictions, \
         accuracy {:.4}, MPKI {:.3}",
        trace_path,
        predictor.name(),
        stats.branches,
        stats.instructions,
        stats.mispredictions,
        stats.accuracy(),
        stats.mpki()
    );

    Ok(stats)
}
