//! Main application entry point.

use inkshot_app::{App, AppError, Args};

fn main() {
    env_logger::init();
    log::info!("Starting Inkshot");

    let result = Args::parse(std::env::args().skip(1)).and_then(|args| App::run(&args));
    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(if matches!(e, AppError::Usage(_)) { 2 } else { 1 });
    }
}
