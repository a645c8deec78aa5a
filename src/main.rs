use std::process::ExitCode;

use pulsar::{Visualizer, VisualizerConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => match VisualizerConfig::load(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.to_string_lossy());
                config
            }
            Err(e) => {
                log::error!("{}: {}", path.to_string_lossy(), e);
                return ExitCode::FAILURE;
            }
        },
        None => VisualizerConfig::default(),
    };

    match Visualizer::new().with_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
