// emergence_probe - synthetic-load diagnostics for the detection engine
//
// Feeds randomly generated signal readings across all categories through one
// detector instance, optionally from several threads, then prints the status
// report and a JSON statistics snapshot. Debugging aid only; the engine's
// contract is its library API.

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use clap::Parser;
use emergence_engine::{
    DetectionListener, DetectorConfig, EmergenceDetector, EmergenceEvent, SignalCategory,
    ThresholdDefaults,
};
use rand::Rng;

#[derive(Parser, Debug)]
#[command(
    name = "emergence_probe",
    about = "Drive the emergence detector with synthetic signals and report statistics"
)]
struct Cli {
    /// Ring buffer capacity in events
    #[arg(long, default_value_t = 256)]
    capacity: usize,
    /// Signal readings to submit per thread
    #[arg(long, default_value_t = 5000)]
    readings: usize,
    /// Producer threads calling the detector concurrently
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Detection threshold applied to every category
    #[arg(long, default_value_t = 0.3)]
    threshold: f64,
    /// Sensitivity multiplier applied to every category
    #[arg(long, default_value_t = 1.0)]
    sensitivity: f64,
    /// Enable feedback-driven threshold adaptation
    #[arg(long)]
    adaptive: bool,
    /// Attach classification labels to stored events
    #[arg(long)]
    classify: bool,
    /// Confirm roughly this fraction of detected events
    #[arg(long, default_value_t = 0.5)]
    confirm_ratio: f64,
}

/// Logs critical events as they fire.
struct CriticalLogger;

impl DetectionListener for CriticalLogger {
    fn on_critical(&self, event: &EmergenceEvent) {
        log::warn!(
            "critical event #{}: {} intensity {:.3} ({})",
            event.id,
            event.category,
            event.intensity,
            event.criticality
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let detector = Arc::new(EmergenceDetector::with_config(DetectorConfig {
        buffer_capacity: cli.capacity,
        thresholds: ThresholdDefaults::default(),
        ..DetectorConfig::default()
    }));
    detector.enable_real_time_mode();
    if cli.adaptive {
        detector.enable_adaptive_thresholds();
    }
    if cli.classify {
        detector.enable_auto_classification();
    }
    for category in SignalCategory::ALL {
        detector.set_threshold(category, cli.threshold)?;
        detector.set_sensitivity(category, cli.sensitivity)?;
    }
    detector.add_listener(Arc::new(CriticalLogger));

    let mut handles = Vec::new();
    for worker in 0..cli.threads.max(1) {
        let detector = Arc::clone(&detector);
        let readings = cli.readings;
        let confirm_ratio = cli.confirm_ratio;
        handles.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let mut detected = 0_u64;
            for _ in 0..readings {
                let category =
                    SignalCategory::ALL[rng.gen_range(0..SignalCategory::COUNT)];
                let signal: f64 = rng.gen();
                if let Ok(Some(id)) =
                    detector.try_detect(category, signal, "probe reading")
                {
                    detected += 1;
                    if rng.gen_bool(confirm_ratio.clamp(0.0, 1.0)) {
                        detector.confirm(id);
                    }
                }
            }
            log::info!("worker {} detected {} events", worker, detected);
        }));
    }
    for handle in handles {
        let _ = handle.join();
    }

    print!("{}", detector.status_report());
    println!(
        "{}",
        serde_json::to_string_pretty(&detector.get_statistics())?
    );
    Ok(())
}
