use bp_lib::predictor::policy::PredictorPolicy;
use bp_lib::predictor::HybridPredictor;
use bp_lib::run_wrapper::replay;
use bp_lib::trace::fetch_records;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path =
        param_tokens.get(1).ok_or("You should specify exactly one trace file")?;
    let records = fetch_records(trace_path)?;

    // Plot one line series per history source:
    // vary the register length and measure the misprediction rate
    let history_lengths: Vec<usize> = vec![4, 8, 12, 16, 21, 24, 28];
    let series_names = ["Global history", "Local history"];

    // Propagate the data
    let mut data: Vec<Vec<(usize, f64)>> = vec![vec![]; series_names.len()];
    let mut y_max: f64 = 0.;
    for (i, _) in series_names.iter().enumerate() {
        for history_length in history_lengths.iter() {
            let base = PredictorPolicy::default();
            let policy = if i == 0 {
                PredictorPolicy {
                    history_length: *history_length,
                    ..base
                }
            } else {
                PredictorPolicy {
                    local_history_length: *history_length,
                    ..base
                }
            };
            let mut predictor = HybridPredictor::make(policy);
            let stats = replay(&mut predictor, &records);
            let rate = 100.0 * stats.mispredict_rate();
            data[i].push((*history_length, rate));
            y_max = y_max.max(rate);
        }
    }
    // Plot the data
    use plotters::prelude::*;

    let trace_base_name = trace_path.split('/').last().unwrap_or(trace_path);
    let plot_title = format!("History length sweep: {}", trace_base_name);
    let output_path = format!("eval/single_eval_{}.svg", trace_base_name);

    let root = SVGBackend::new(output_path.as_str(), (800, 600))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..32, 0.0..(y_max * 1.1).max(1.0))?;
    ctx.configure_mesh()
        .x_desc("History length (bits)")
        .y_desc("Misprediction rate (%)")
        .draw()?;

    for (i, name) in series_names.iter().enumerate() {
        let series = data[i].iter().map(|(x, y)| (*x as i32, *y));
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))?
            .label(*name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color)
            });
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;

    Ok(())
}
