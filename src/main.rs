//! Pump schedule optimizer entry point: CLI wiring and the scenario loop.

use std::fs;
use std::process;

use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use pump_sim::cli::{CliArgs, telemetry_path};
use pump_sim::driver::OptimizationDriver;
use pump_sim::io::export::export_csv;
use pump_sim::reporting::{SolutionReport, export_json};

fn main() {
    let args = CliArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {e}");
    }

    let config = match args.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    if let Some(dir) = &args.telemetry_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("error: cannot create \"{}\": {e}", dir.display());
            process::exit(1);
        }
    }

    let driver = OptimizationDriver::new(config);
    let mut reports = Vec::new();

    for &scenario in args.demand.scenarios() {
        for &cycles in &args.cycles {
            let solution = match driver.optimize(scenario, cycles) {
                Ok(solution) => solution,
                Err(e) => {
                    println!("\n{scenario} demand, {cycles} cycles: no solution found ({e})");
                    continue;
                }
            };

            let report = SolutionReport::from_solution(&solution);
            println!("\n{report}");
            println!("\n{}", solution.kpi);

            if let Some(dir) = &args.telemetry_dir {
                let path = telemetry_path(dir, scenario, cycles);
                if let Err(e) = export_csv(&solution.outcome.series, &path) {
                    eprintln!("error: failed to write CSV: {e}");
                    process::exit(1);
                }
                eprintln!("Telemetry written to {}", path.display());
            }
            reports.push(report);
        }
    }

    if let Some(path) = &args.report_out {
        if let Err(e) = export_json(&reports, path) {
            eprintln!("error: failed to write report: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {}", path.display());
    }
}
