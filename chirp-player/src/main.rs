use std::fs::File;
use std::process::ExitCode;

use chirp_audio::PacedBackend;
use chirp_core::{Config, SoundBoard};
use chirp_types::BuiltinSlot;

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("chirp")
        .join("chirp.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/chirp.log")) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("logging disabled: {}", e);
            return;
        }
    };

    if let Err(e) = WriteLogger::init(log_level, simplelog::Config::default(), log_file) {
        eprintln!("logging disabled: {}", e);
        return;
    }

    log::info!("chirp starting (log level: {:?})", log_level);
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let config = Config::load();
    let board = SoundBoard::new(Box::new(PacedBackend::new()), &config);

    let ids: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with('-'))
        .collect();

    if ids.is_empty() {
        for id in board.recipe_ids() {
            match BuiltinSlot::from_name(&id) {
                Some(_) => println!("{}  (built-in)", id),
                None => println!("{}", id),
            }
        }
        return ExitCode::SUCCESS;
    }

    let mut status = ExitCode::SUCCESS;
    for id in ids {
        if !board.compile_and_enqueue(id, 0.0, 0.0, 0) {
            eprintln!("unknown recipe: {}", id);
            status = ExitCode::FAILURE;
        }
    }

    match config.wait_timeout() {
        Some(timeout) => {
            if !board.await_all_finished_timeout(timeout) {
                log::warn!(
                    "gave up waiting after {:?} ({} still queued)",
                    timeout,
                    board.queue_length()
                );
                status = ExitCode::FAILURE;
            }
        }
        None => board.await_all_finished(),
    }
    status
}
