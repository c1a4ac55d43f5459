use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rci::config::{RciConfig, SampleRate, TimestampSource};
use rci::error::RciError;
use rci::input::{EventSource, JsonLinesSource};
use rci::output::{FormatterSink, JsonFormatter, RecordSink};
use rci::recording::{ControlCommand, Event, MeasurementRecord, Recorder};

#[derive(Parser, Debug)]
#[command(name = "analyze_drive")]
#[command(about = "Summarize road roughness over recorded drives", long_about = None)]
struct Args {
    /// Event files (JSON lines) to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Accelerometer rate (e.g., "50", "50hz", "20ms")
    #[arg(long)]
    sample_rate: Option<SampleRate>,

    /// Samples per window
    #[arg(short, long)]
    window_size: Option<usize>,

    /// Start recording at the first event instead of waiting for a start command
    #[arg(long)]
    auto_start: bool,

    /// Write every record as JSON lines to this file
    #[arg(long)]
    dump_records: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileAnalysis {
    filename: String,
    events: usize,
    malformed_lines: usize,
    sessions: usize,
    records: usize,
    distance_m: f64,
    roughness: Option<StatsSummary>,
    vdv: Option<StatsSummary>,
    crest_factor: Option<StatsSummary>,
    avg_speed: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Running totals while a drive is replayed
struct DriveSummary {
    events: usize,
    malformed_lines: usize,
    sessions: usize,
    distance_m: f64,
    roughness: Stats<f64>,
    vdv: Stats<f64>,
    crest_factor: Stats<f64>,
    avg_speed: Stats<f64>,
}

impl DriveSummary {
    fn new() -> Self {
        Self {
            events: 0,
            malformed_lines: 0,
            sessions: 0,
            distance_m: 0.0,
            roughness: Stats::new(),
            vdv: Stats::new(),
            crest_factor: Stats::new(),
            avg_speed: Stats::new(),
        }
    }

    /// Feed one event through the recorder, tracking sessions and distance
    fn observe(&mut self, event: &Event, recorder: &mut Recorder) -> Option<MeasurementRecord> {
        self.events += 1;

        match event {
            Event::Control {
                command: ControlCommand::Start,
            } if !recorder.is_recording() => self.sessions += 1,
            Event::Control {
                command: ControlCommand::Stop,
            } => self.close_session(recorder),
            _ => {}
        }

        let record = recorder.handle(event)?;
        self.roughness.update(record.roughness);
        self.vdv.update(record.vdv);
        if let Some(crest) = record.crest_factor {
            self.crest_factor.update(crest);
        }
        self.avg_speed.update(record.avg_speed);
        Some(record)
    }

    /// Bank the distance of the running session before it is stopped
    fn close_session(&mut self, recorder: &Recorder) {
        if let Some(distance) = recorder.distance_m() {
            self.distance_m += distance;
        }
    }

    fn into_analysis(self, filename: String) -> FileAnalysis {
        FileAnalysis {
            filename,
            events: self.events,
            malformed_lines: self.malformed_lines,
            sessions: self.sessions,
            records: self.roughness.count,
            distance_m: self.distance_m,
            roughness: StatsSummary::from_stats(&self.roughness),
            vdv: StatsSummary::from_stats(&self.vdv),
            crest_factor: StatsSummary::from_stats(&self.crest_factor),
            avg_speed: StatsSummary::from_stats(&self.avg_speed),
            error: None,
        }
    }
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

    let mut config = match args.config {
        Some(ref path) => RciConfig::from_file(path)?,
        None => RciConfig::default(),
    };
    if let Some(rate) = args.sample_rate {
        config.sampling.sample_rate_hz = rate.as_hz();
    }
    if let Some(size) = args.window_size {
        config.sampling.window_size = size;
    }
    // Replays are judged by capture time, not by when they are replayed
    config.record.timestamp_source = TimestampSource::EventTime;
    config.validate()?;

    let mut dump = match args.dump_records {
        Some(ref path) => Some(FormatterSink::new(
            Box::new(JsonFormatter),
            BufWriter::new(File::create(path)?),
        )),
        None => None,
    };

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| {
            let sink = dump.as_mut().map(|s| s as &mut dyn RecordSink);
            analyze_file(path, &config, args.auto_start, sink)
        })
        .collect();

    if let Some(ref mut sink) = dump {
        sink.flush()?;
    }

    match args.format {
        OutputFormat::Text => print_text(&results, &config),
        OutputFormat::Csv => print_csv(&results),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

fn analyze_file(
    path: &Path,
    config: &RciConfig,
    auto_start: bool,
    dump: Option<&mut dyn RecordSink>,
) -> FileAnalysis {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match analyze_file_impl(path, config, auto_start, dump) {
        Ok(summary) => summary.into_analysis(filename),
        Err(e) => FileAnalysis {
            filename,
            events: 0,
            malformed_lines: 0,
            sessions: 0,
            records: 0,
            distance_m: 0.0,
            roughness: None,
            vdv: None,
            crest_factor: None,
            avg_speed: None,
            error: Some(e.to_string()),
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    config: &RciConfig,
    auto_start: bool,
    dump: Option<&mut dyn RecordSink>,
) -> anyhow::Result<DriveSummary> {
    let source = JsonLinesSource::open(path)?;
    replay(source, config, auto_start, dump)
}

fn replay<S: EventSource>(
    mut source: S,
    config: &RciConfig,
    auto_start: bool,
    mut dump: Option<&mut dyn RecordSink>,
) -> anyhow::Result<DriveSummary> {
    let mut recorder = Recorder::new(config)?;
    let mut summary = DriveSummary::new();

    if auto_start {
        recorder.start();
        summary.sessions += 1;
    }

    loop {
        let event = match source.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(RciError::MalformedEvent { line, message }) => {
                log::warn!("Skipping line {}: {}", line, message);
                summary.malformed_lines += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(record) = summary.observe(&event, &mut recorder)
            && let Some(sink) = dump.as_deref_mut()
            && let Err(e) = sink.submit(&record)
        {
            log::warn!("Failed to dump record: {}", e);
        }
    }

    // Input ended mid-session
    summary.close_session(&recorder);
    recorder.stop();

    Ok(summary)
}

fn print_text(results: &[FileAnalysis], config: &RciConfig) {
    eprintln!(
        "Window: {} samples at {} Hz",
        config.sampling.window_size, config.sampling.sample_rate_hz
    );
    eprintln!();

    println!(
        "{:<40} {:>8} {:>10} {:>8} {:>10} {:>8} {:>10} {:>10}",
        "File", "Sessions", "Records", "RMS", "RMS std", "VDV", "Crest", "Distance"
    );
    println!("{}", "-".repeat(111));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }

        let rms_mean = result
            .roughness
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        let rms_std = result
            .roughness
            .as_ref()
            .map(|s| format!("{:.4}", s.std_dev))
            .unwrap_or_else(|| "-".to_string());
        let vdv = result
            .vdv
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        let crest = result
            .crest_factor
            .as_ref()
            .map(|s| format!("{:.2}", s.mean))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<40} {:>8} {:>10} {:>8} {:>10} {:>8} {:>10} {:>9.1}m",
            result.filename,
            result.sessions,
            result.records,
            rms_mean,
            rms_std,
            vdv,
            crest,
            result.distance_m
        );

        if result.malformed_lines > 0 {
            println!("  {} malformed lines skipped", result.malformed_lines);
        }
    }
}

fn print_csv(results: &[FileAnalysis]) {
    println!(
        "filename,events,sessions,records,roughness_mean,roughness_std,roughness_max,vdv_mean,crest_factor_mean,avg_speed_mean,distance_m,error"
    );
    for result in results {
        let roughness_mean = result
            .roughness
            .as_ref()
            .map(|s| format!("{:.6}", s.mean))
            .unwrap_or_default();
        let roughness_std = result
            .roughness
            .as_ref()
            .map(|s| format!("{:.6}", s.std_dev))
            .unwrap_or_default();
        let roughness_max = result
            .roughness
            .as_ref()
            .map(|s| format!("{:.6}", s.max))
            .unwrap_or_default();
        let vdv_mean = result
            .vdv
            .as_ref()
            .map(|s| format!("{:.6}", s.mean))
            .unwrap_or_default();
        let crest_mean = result
            .crest_factor
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_default();
        let speed_mean = result
            .avg_speed
            .as_ref()
            .map(|s| format!("{:.3}", s.mean))
            .unwrap_or_default();
        let error = result.error.as_deref().unwrap_or("");

        println!(
            "{},{},{},{},{},{},{},{},{},{},{:.2},{}",
            result.filename,
            result.events,
            result.sessions,
            result.records,
            roughness_mean,
            roughness_std,
            roughness_max,
            vdv_mean,
            crest_mean,
            speed_mean,
            result.distance_m,
            error
        );
    }
}

fn print_json(results: &[FileAnalysis]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rci::recording::{MotionEvent, PositionEvent};
    use std::io::Cursor;

    fn source_for(events: &[Event]) -> JsonLinesSource<Cursor<Vec<u8>>> {
        let mut buf = Vec::new();
        rci::input::write_events(&mut buf, events).unwrap();
        JsonLinesSource::new(Cursor::new(buf))
    }

    fn small_config() -> RciConfig {
        let mut config = RciConfig::default();
        config.sampling.window_size = 10;
        config.record.timestamp_source = TimestampSource::EventTime;
        config
    }

    fn motion(i: i64) -> Event {
        Event::Motion(MotionEvent {
            value: (i as f64 * 0.9).sin(),
            captured_at: i * 20,
        })
    }

    fn fix(latitude: f64, captured_at: i64) -> Event {
        Event::Position(PositionEvent {
            latitude,
            longitude: 5.0,
            speed: Some(10.0),
            heading: None,
            captured_at,
        })
    }

    #[test]
    fn test_sessions_and_distance_summed_across_stops() {
        let mut events = vec![Event::from(ControlCommand::Start), fix(52.0, 0), fix(52.001, 100)];
        events.extend((0..25).map(motion));
        events.push(Event::from(ControlCommand::Stop));
        events.push(Event::from(ControlCommand::Start));
        events.push(fix(52.0, 1000));
        events.push(fix(52.002, 1100));
        events.extend((25..35).map(motion));
        events.push(Event::from(ControlCommand::Stop));

        let summary = replay(source_for(&events), &small_config(), false, None).unwrap();

        assert_eq!(summary.sessions, 2);
        assert_eq!(summary.roughness.count, 3);
        // 0.001° + 0.002° of latitude
        assert!((summary.distance_m - 333.6).abs() < 0.5, "got {}", summary.distance_m);
    }

    #[test]
    fn test_auto_start_records_without_commands() {
        let events: Vec<Event> = (0..20).map(motion).collect();

        let idle = replay(source_for(&events), &small_config(), false, None).unwrap();
        assert_eq!(idle.roughness.count, 0);
        assert_eq!(idle.sessions, 0);

        let started = replay(source_for(&events), &small_config(), true, None).unwrap();
        assert_eq!(started.roughness.count, 2);
        assert_eq!(started.sessions, 1);
    }

    #[test]
    fn test_malformed_lines_counted() {
        let input = "{\"type\":\"control\",\"command\":\"start\"}\nnot json\n";
        let source = JsonLinesSource::new(Cursor::new(input.as_bytes().to_vec()));
        let summary = replay(source, &small_config(), false, None).unwrap();
        assert_eq!(summary.malformed_lines, 1);
        assert_eq!(summary.events, 1);
    }
}
