use bp_lib::predictor::policy::LocalUpdateWidth;
use bp_lib::predictor::policy::PredictorPolicy;
use bp_lib::predictor::static_bp::StaticPredictor;
use bp_lib::predictor::ConditionalBranchPredictor;
use bp_lib::predictor::HybridPredictor;
use bp_lib::run_wrapper;
use bp_lib::run_wrapper::RunStats;
use std::env;
use std::error::Error;

enum PolicyArg {
    Hybrid(PredictorPolicy),
    Baseline,
}

fn print_stats(name: &str, stats: &RunStats) {
    println!("Predictor: {}", name);
    println!(
        "Branches: {}, instructions: {}, mispredictions: {}",
        stats.branches, stats.instructions, stats.mispredictions
    );
    println!(
        "Accuracy: {:.4}, MPKI: {:.3}",
        stats.accuracy(),
        stats.mpki()
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let trace_file = args
        .next()
        .ok_or("You should specify exactly one trace file")?;

    let mut verbose = false;
    let mut history = false;
    let mut policy = PolicyArg::Hybrid(PredictorPolicy::default());

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => verbose = true,
            "-h" => history = true,
            "-p" => {
                let policy_arg = args
                    .next()
                    .ok_or("You should specify a predictor policy after -p")?;
                policy = match policy_arg.as_str() {
                    "default" => PolicyArg::Hybrid(PredictorPolicy::default()),
                    "fixed-local" => PolicyArg::Hybrid(PredictorPolicy {
                        local_update_width: LocalUpdateWidth::LocalPht,
                        ..Default::default()
                    }),
                    "half" => PolicyArg::Hybrid(PredictorPolicy::half_size()),
                    "baseline" => PolicyArg::Baseline,
                    _ => {
                        return Err(
                            "Invalid predictor policy specified after -p".into()
                        )
                    }
                };
            }
            _ => return Err(format!("Unknown parameter: {}", arg).into()),
        }
    }

    let level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env).init();

    match policy {
        PolicyArg::Hybrid(policy) => {
            policy.validate()?;
            let mut predictor = HybridPredictor::make(policy);
            let stats = run_wrapper::run_trace(&mut predictor, &trace_file)?;
            print_stats(predictor.name(), &stats);

            if history {
                eprintln!("[HISTORY] storage = {} bits", policy.storage_bits());
                eprintln!("[HISTORY] {:?}", predictor.history);
                eprintln!("[HISTORY] MPKI = {:.3}", stats.mpki());
            }
        }
        PolicyArg::Baseline => {
            let mut predictor = StaticPredictor;
            let stats = run_wrapper::run_trace(&mut predictor, &trace_file)?;
            print_stats(predictor.name(), &stats);
        }
    }

    Ok(())
}
