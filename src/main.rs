use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use voice_kiosk_lib::capture::{LineCapture, SpeechCapture};
use voice_kiosk_lib::catalog::{self, Catalog};
use voice_kiosk_lib::config::KioskSettings;
use voice_kiosk_lib::pipeline::Disposition;
use voice_kiosk_lib::recovery::{CaptureSupervisor, RetryPolicy};
use voice_kiosk_lib::settings_store;
use voice_kiosk_lib::{KioskPipeline, SessionOutcome};

/// Console kiosk: each stdin line is one finished utterance
#[derive(Parser)]
#[command(name = "voice-kiosk", version, about)]
struct Cli {
    /// Menu catalog JSON (overrides the settings file)
    #[arg(short, long, env = "VOICE_KIOSK_CATALOG")]
    catalog: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long, env = "VOICE_KIOSK_SETTINGS")]
    settings: Option<PathBuf>,

    /// Begin in the listening state instead of waiting for "start recording"
    #[arg(short, long)]
    listening: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,voice_kiosk_lib=info",
        1 => "info,voice_kiosk_lib=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> voice_kiosk_lib::Result<()> {
    let settings_path = cli
        .settings
        .unwrap_or_else(settings_store::default_settings_path);
    let settings = settings_store::load_or_default(&settings_path);
    let catalog = load_catalog(cli.catalog, &settings)?;
    info!(items = catalog.len(), "catalog loaded");

    let mut pipeline = KioskPipeline::from_settings(catalog, &settings);
    if cli.listening {
        report(&pipeline.start_capture());
    }

    let stdin = io::stdin();
    let capture = LineCapture::new(stdin.lock());
    run_session(&mut pipeline, capture, RetryPolicy::from_settings(&settings))
}

fn load_catalog(path: Option<PathBuf>, settings: &KioskSettings) -> voice_kiosk_lib::Result<Catalog> {
    let path = path.or_else(|| settings.catalog_path.as_ref().map(PathBuf::from));
    match path {
        Some(path) => catalog::load(&path),
        None => Ok(catalog::default_catalog()),
    }
}

fn run_session<R: BufRead>(
    pipeline: &mut KioskPipeline,
    capture: LineCapture<R>,
    policy: RetryPolicy,
) -> voice_kiosk_lib::Result<()> {
    let mut supervisor = CaptureSupervisor::new(capture, policy);
    supervisor.start()?;

    while let Some(delivery) = supervisor.next_delivery()? {
        let Some(outcome) = pipeline.on_delivery(&delivery) else {
            continue;
        };
        report(&outcome);
        if outcome.clear_capture_buffer {
            // Lines never accumulate, so the buffer is already clear.
            pipeline.reset_capture();
        }
    }

    supervisor.stop();
    info!(label = supervisor.capture().label(), "input exhausted");
    Ok(())
}

fn report(outcome: &SessionOutcome) {
    if outcome.disposition == Disposition::Gated {
        println!("(idle) say \"start recording\" to order");
        return;
    }
    if !outcome.status_message.is_empty() {
        println!("{}", outcome.status_message);
    }
    if let Some(navigation) = outcome.navigation {
        println!("-> {navigation:?}");
    }
    for entry in outcome.cart.entries() {
        println!("   {:>3} x {}", entry.quantity, entry.name);
    }
}
