use bp_lib::predictor::policy::LocalUpdateWidth;
use bp_lib::predictor::policy::PredictorPolicy;
use bp_lib::predictor::static_bp::StaticPredictor;
use bp_lib::predictor::HybridPredictor;
use bp_lib::run_wrapper::replay;
use bp_lib::run_wrapper::RunStats;
use bp_lib::trace::fetch_records;

fn stats_record(
    policy: &str,
    storage_bits: usize,
    stats: &RunStats,
) -> Vec<String> {
    vec![
        policy.to_string(),
        storage_bits.to_string(),
        stats.branches.to_string(),
        stats.mispredictions.to_string(),
        format!("{:.4}", stats.accuracy()),
        format!("{:.3}", stats.mpki()),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path =
        param_tokens.get(1).ok_or("You should specify exactly one trace file")?;
    let trace_base_name = trace_path.split('/').last().unwrap_or(trace_path);
    let output_path = format!("eval/multi_eval_{}.csv", trace_base_name);

    let records = fetch_records(trace_path)?;

    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record([
        "Policy",
        "Storage (bits)",
        "Branches",
        "Mispredictions",
        "Accuracy",
        "MPKI",
    ])?;

    // Always-not-taken baseline
    {
        let stats = replay(&mut StaticPredictor, &records);
        writer.write_record(stats_record("Always not taken", 0, &stats))?;
    }

    let policies = [
        ("2Bc-gskew-pskew", PredictorPolicy::default()),
        (
            "2Bc-gskew-pskew (local width fixed)",
            PredictorPolicy {
                local_update_width: LocalUpdateWidth::LocalPht,
                ..Default::default()
            },
        ),
        ("2Bc-gskew-pskew (half size)", PredictorPolicy::half_size()),
    ];

    for (name, policy) in policies {
        let mut predictor = HybridPredictor::make(policy);
        let stats = replay(&mut predictor, &records);
        writer.write_record(stats_record(name, policy.storage_bits(), &stats))?;
    }

    writer.flush()?;

    Ok(())
}
