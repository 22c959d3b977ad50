use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use visioncount::{Counting, CountingConfig, Frame, LineCounter};

#[derive(Parser, Debug)]
#[command(
    name = "visioncount",
    about = "Counts tracked objects per class from a JSON-lines stream of frames"
)]
struct Args {
    /// Frames file, one JSON frame per line. `-` reads stdin
    #[arg(long, default_value = "-")]
    input: String,
    /// Class names in class id order
    #[arg(long, value_delimiter = ',', required = true)]
    classes: Vec<String>,
    /// JSON counting configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Minimum confidence; weaker detections never reach the counter
    #[arg(long, default_value_t = 0.8)]
    conf: f32,
    /// Print count events as JSON lines on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("visioncount=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CountingConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CountingConfig::default(),
    };

    info!(
        classes = args.classes.len(),
        conf = args.conf,
        trigger = ?config.trigger,
        "counter starting"
    );

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input).with_context(|| format!("opening {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let mut counter = LineCounter::with_config(args.classes.iter().cloned(), config);
    let stdout = io::stdout();

    replay(reader, &mut counter, args.conf, args.json, &mut stdout.lock())
}

/// Feeds every frame line to `counter`. Blank lines are ignored, a `reset`
/// line resets the counts and malformed lines are logged and skipped. With
/// `json` set, count events go out as JSON lines followed by one final
/// `{"counts": ...}` object; otherwise the totals are printed as `class: count`.
fn replay<R: BufRead, W: Write>(
    reader: R,
    counter: &mut LineCounter,
    min_conf: f32,
    json: bool,
    out: &mut W,
) -> Result<()> {
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line == "reset" {
            counter.reset();
            continue;
        }

        let mut frame: Frame = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(line = lineno + 1, "wrong frame format: {}", err);
                continue;
            }
        };

        frame.retain_confident(min_conf);

        let report = match counter.update(&frame) {
            Ok(report) => report,
            Err(err) => {
                warn!(line = lineno + 1, "frame skipped: {}", err);
                continue;
            }
        };

        if json {
            for event in &report.events {
                serde_json::to_writer(&mut *out, event)?;
                writeln!(out)?;
            }
        }
    }

    let counts = counter.counts();
    info!(
        frames = counter.frames(),
        elapsed = counter.elapsed(),
        total = counts.values().sum::<u64>(),
        "stream finished"
    );

    if json {
        serde_json::to_writer(&mut *out, &serde_json::json!({ "counts": counts }))?;
        writeln!(out)?;
    } else {
        for (class, count) in &counts {
            writeln!(out, "{}: {}", class, count)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame_line(ts: f32, id: u32, cy: f32, p: f32) -> String {
        format!(
            r#"{{"dims": [640, 480], "timestamp": {}, "detections": [{{"id": {}, "bbox": [100, {}, 140, {}], "p": {}, "c": 0}}]}}"#,
            ts,
            id,
            cy - 15.0,
            cy + 15.0,
            p
        )
    }

    fn run(lines: &[String], json: bool) -> (LineCounter, String) {
        let mut counter = LineCounter::new(["bolt", "nut"]);
        let mut out = Vec::new();

        replay(Cursor::new(lines.join("\n")), &mut counter, 0.8, json, &mut out).unwrap();

        (counter, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_replay_prints_totals() {
        let lines = vec![frame_line(0.0, 1, 310.0, 0.9), frame_line(0.1, 1, 72.0, 0.9)];
        let (counter, out) = run(&lines, false);

        assert_eq!(counter.counts().get("bolt"), Some(&1));
        assert_eq!(out, "bolt: 1\n");
    }

    #[test]
    fn test_replay_reset_line_clears_counts() {
        let lines = vec![
            frame_line(0.0, 1, 310.0, 0.9),
            frame_line(0.1, 1, 72.0, 0.9),
            "reset".to_string(),
            frame_line(0.2, 2, 310.0, 0.9),
        ];
        let (counter, out) = run(&lines, false);

        assert!(counter.counts().is_empty());
        assert_eq!(counter.frames(), 3);
        assert_eq!(out, "");
    }

    #[test]
    fn test_replay_skips_bad_lines() {
        let lines = vec![
            frame_line(0.0, 1, 310.0, 0.9),
            "{not a frame".to_string(),
            String::new(),
            frame_line(0.1, 1, 72.0, 0.9),
        ];
        let (counter, _) = run(&lines, false);

        assert_eq!(counter.frames(), 2);
        assert_eq!(counter.counts().get("bolt"), Some(&1));
    }

    #[test]
    fn test_replay_drops_weak_detections() {
        let lines = vec![frame_line(0.0, 1, 310.0, 0.5), frame_line(0.1, 1, 72.0, 0.5)];
        let (counter, out) = run(&lines, false);

        assert!(counter.counts().is_empty());
        assert_eq!(counter.scene().map(|s| s.num_tracks()), Some(0));
        assert_eq!(out, "");
    }

    #[test]
    fn test_replay_json_ends_with_counts() {
        let lines = vec![frame_line(0.0, 1, 310.0, 0.9), frame_line(0.1, 1, 72.0, 0.9)];
        let (_, out) = run(&lines, true);

        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["class_name"], "bolt");
        assert_eq!(lines[0]["total"], 1);
        assert_eq!(lines[1]["counts"]["bolt"], 1);
    }
}
