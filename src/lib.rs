pub mod counter;
pub mod predictor;
pub mod run_wrapper;
pub mod trace;

pub mod error;
