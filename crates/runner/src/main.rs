use kiwi_gateway::{TradingFacade, load_config, load_default_config};
use kiwi_runner::{DEMO_STOCKS, RunnerError, run_session, seeded_control};
use kiwi_sim::SimConfig;
use log::info;
use std::sync::Arc;

fn print_help() {
    eprintln!(
        r#"Kiwi Runner - trading facade demo against the simulated broker

USAGE:
    kiwi-runner [OPTIONS]

OPTIONS:
    --config <PATH>     Load bridge configuration from JSON file
    --live              Send orders to the simulated broker (disables simulation mode)
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (e.g. info, kiwi_gateway=debug)
"#
    );
}

fn main() -> Result<(), RunnerError> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut live = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| RunnerError::Usage("--config requires a path argument".into()))?;
                config_path = Some(path.clone());
            }
            "--live" => live = true,
            arg => {
                print_help();
                return Err(RunnerError::Usage(format!("unknown argument: {}", arg)));
            }
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            load_config(path)?
        }
        None => load_default_config()?,
    };
    if live {
        config = config.with_simulation(false);
    }
    config.validate()?;

    let control = Arc::new(seeded_control(SimConfig::default())?);
    let facade = TradingFacade::new(control, config);

    let report = run_session(&facade, DEMO_STOCKS[0].code);
    if !report.is_clean() {
        for (step, err) in &report.failed {
            eprintln!("{}: {}", step, err);
        }
    }
    Ok(())
}
