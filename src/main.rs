//! Log PM2.5 and/or BME680 readings to CSV.
//!
//! ```text
//! airsample --duration 600 --interval 2 --port /dev/serial0
//! airsample --sensor both --duration 30 --output air_weather.csv
//! ```

use std::process::ExitCode;

use airsample::{
    config::{Cli, SensorKind, Settings},
    sensors::{Bme680Source, Pm25Uart},
    Combined, SampleSource, Sampler, StopSignal, SystemClock,
};
use anyhow::{Context, Result};
use clap::Parser;
use linux_embedded_hal as hal;
use log::{error, info};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn open_source(settings: &Settings) -> Result<Box<dyn SampleSource>> {
    let source: Box<dyn SampleSource> = match settings.sensor {
        SensorKind::Pm25 => Box::new(Pm25Uart::open(&settings.port)?),
        SensorKind::Bme680 => Box::new(Bme680Source::open(
            &settings.i2c_bus,
            settings.sea_level_hpa,
        )?),
        SensorKind::Both => Box::new(Combined::new(
            Pm25Uart::open(&settings.port)?,
            Bme680Source::open(&settings.i2c_bus, settings.sea_level_hpa)?,
        )),
    };
    Ok(source)
}

fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings(chrono::Local::now())?;
    let session = &settings.session;

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.trigger())
        .context("failed to install signal handler")?;

    let source = open_source(&settings).context("failed to open sensor")?;
    info!(
        "{:?} logging started: duration={}s interval={}s",
        settings.sensor,
        session.duration().as_secs_f64(),
        session.interval().as_secs_f64(),
    );
    info!("source: {}", source.id());
    info!("output: {}", session.output_path().display());

    let mut sampler = Sampler::new(source, SystemClock::new(hal::Delay))
        .with_stop(stop)
        .with_backoff(settings.retry_backoff);
    if !settings.echo {
        sampler = sampler.with_console(std::io::sink());
    }
    let summary = sampler.run(session)?;

    println!(
        "Done. Logged {} readings to {}",
        summary.rows,
        session.output_path().display()
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
