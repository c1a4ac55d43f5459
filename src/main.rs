use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::thread;

use rci::config::{RciConfig, SampleRate, TimestampSource};
use rci::error::RciError;
use rci::input::{EventSource, JsonLinesSource};
use rci::output::{FanoutSink, FormatterSink, JsonFormatter, OutputFormat, create_formatter};
use rci::recording::{self, Event, EventSenders, Recorder};

const QUEUE_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "rci")]
#[command(about = "Compute road roughness records from a JSON-lines event stream")]
#[command(
    long_about = "Compute road roughness records from a JSON-lines event stream.\n\n\
Motion and position events are handed to separate queues and handled on one \
thread. Order is preserved within each queue but not across them, so the \
window a GPS fix's speed is counted in may vary from run to run on \
interleaved input. Use analyze_drive for strictly ordered replay. Start and \
stop commands in the stream are ignored: the session spans the whole input."
)]
struct Args {
    /// Event file (JSON lines); reads stdin when omitted
    input: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device identifier stamped on every record
    #[arg(short, long)]
    device_id: Option<String>,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write every record as JSON lines to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Accelerometer rate (e.g., "50", "50hz", "20ms")
    #[arg(long)]
    sample_rate: Option<SampleRate>,

    /// Samples per window
    #[arg(short, long)]
    window_size: Option<usize>,

    /// Record timestamp source: wall-clock, event-time
    #[arg(long, value_enum)]
    timestamp_source: Option<TimestampSource>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> anyhow::Result<RciConfig> {
    let mut config = match args.config {
        Some(ref path) => RciConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RciConfig::default(),
    };

    if let Some(ref device_id) = args.device_id {
        config.record.device_id = device_id.clone();
    }
    if let Some(rate) = args.sample_rate {
        config.sampling.sample_rate_hz = rate.as_hz();
    }
    if let Some(size) = args.window_size {
        config.sampling.window_size = size;
    }
    if let Some(source) = args.timestamp_source {
        config.record.timestamp_source = source;
    }

    config.validate()?;
    Ok(config)
}

/// Read events and push them onto the dispatcher queues until input ends.
///
/// The session spans the whole input, so control commands are not forwarded.
fn pump_events(mut source: Box<dyn EventSource>, senders: EventSenders) -> rci::Result<u64> {
    let mut forwarded = 0u64;

    loop {
        match source.next_event() {
            Ok(Some(Event::Control { command })) => {
                log::debug!("Ignoring {:?} command in stream input", command);
            }
            Ok(Some(event)) => {
                senders.send(event)?;
                forwarded += 1;
            }
            Ok(None) => break,
            Err(RciError::MalformedEvent { line, message }) => {
                log::warn!("Skipping malformed event on line {}: {}", line, message);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(forwarded)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    log::info!(
        "Device {}: {} Hz, window {} samples, high-pass {} Hz, low-pass {} Hz",
        config.record.device_id,
        config.sampling.sample_rate_hz,
        config.sampling.window_size,
        config.filter.highpass_cutoff_hz,
        config.filter.lowpass_cutoff_hz
    );

    let mut sink = FanoutSink::new();
    sink.push(Box::new(FormatterSink::new(
        create_formatter(args.format, args.verbose > 0),
        io::stdout(),
    )));
    if let Some(ref path) = args.save {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        sink.push(Box::new(FormatterSink::new(
            Box::new(JsonFormatter),
            BufWriter::new(file),
        )));
    }

    let source: Box<dyn EventSource> = match args.input {
        Some(ref path) => Box::new(
            JsonLinesSource::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(JsonLinesSource::new(BufReader::new(io::stdin()))),
    };

    let mut recorder = Recorder::new(&config)?;
    recorder.start();

    let (senders, dispatcher) = recording::channels(QUEUE_CAPACITY);
    let reader = thread::spawn(move || pump_events(source, senders));

    let stats = dispatcher.run(&mut recorder, &mut sink);

    let forwarded = reader
        .join()
        .map_err(|_| anyhow::anyhow!("Event reader thread panicked"))??;

    log::info!(
        "Processed {} events ({} motion, {} position): {} records, {} delivery failures",
        forwarded,
        stats.motion_events,
        stats.position_events,
        stats.records_emitted,
        stats.delivery_failures
    );

    Ok(())
}
