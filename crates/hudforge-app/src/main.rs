//! Host shell entry point.

use hudforge_app::{App, AppConfig};
use std::path::PathBuf;

fn main() {
    env_logger::init();
    log::info!("Starting hudforge");

    let mut config = AppConfig::default();
    if let Some(path) = std::env::args_os().nth(1) {
        config.storage_path = Some(PathBuf::from(path));
    }

    App::with_config(config).run();
}
