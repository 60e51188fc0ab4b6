//! CLI for wxbridge — forward rtl_433 weather readings to Weather Underground.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use wxbridge_core::{translate, Config, Decoder, Reading, TrackerRegistry, Uploader};

/// How long the decoder gets to exit after a termination request before it
/// is force-killed.
const DECODER_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "wxbridge")]
#[command(about = "Forward rtl_433 weather-station readings to Weather Underground")]
#[command(version = wxbridge_core::VERSION)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Path to the tracker state file persisted across runs
    #[arg(short, long, default_value = "trackers.json")]
    state: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Configuration problems are the only fatal errors: exit before the
    // read loop ever starts.
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    // Tracker state is fail-open; a bad file just means a cold start.
    let mut registry = TrackerRegistry::load(&args.state);

    // The handler only flags; the save → terminate sequence runs once,
    // after the read loop ends.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::error!("could not install signal handler: {e}");
        process::exit(1);
    }

    log::info!(
        "starting uploads for station {}",
        config.wunderground.station.station_id
    );
    log::info!(
        "decoder command: {}",
        Decoder::command_line(&config.rtl_sdr).join(" ")
    );

    let mut decoder = match Decoder::spawn(&config.rtl_sdr) {
        Ok(decoder) => decoder,
        Err(e) => {
            log::error!("could not start decoder process: {e}");
            process::exit(1);
        }
    };

    let uploader = Uploader::new();

    if let Some(lines) = decoder.lines() {
        for line in lines {
            if !running.load(Ordering::SeqCst) {
                log::info!("stop requested, leaving read loop");
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("error reading from decoder: {e}");
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reading: Reading = match serde_json::from_str(line) {
                Ok(reading) => reading,
                Err(e) => {
                    log::warn!("skipping invalid JSON from decoder: {e}");
                    continue;
                }
            };
            log::debug!("received reading: {line}");

            let record = translate(
                &reading,
                &config.wunderground.translations,
                &config.wunderground.station,
                &mut registry,
            );
            match uploader.upload(&record) {
                Ok(()) => log::debug!("uploaded reading"),
                Err(e) => log::warn!("{e}"),
            }
        }
    }

    // Shutdown sequence: persist tracker state first, then take the
    // decoder down and report how it ended.
    match registry.save(&args.state) {
        Ok(()) => log::info!(
            "saved {} tracker(s) to {}",
            registry.len(),
            args.state.display()
        ),
        Err(e) => log::warn!("could not save tracker state: {e}"),
    }

    let stopped = !running.load(Ordering::SeqCst);
    let exit = decoder.shutdown(DECODER_GRACE);
    if !stopped && !exit.success() {
        log::error!("decoder exited abnormally (code {:?})", exit.code);
        if !exit.stderr.is_empty() {
            log::error!("decoder stderr:\n{}", exit.stderr.trim_end());
        }
        process::exit(1);
    }
}
