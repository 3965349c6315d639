//! Ranking progress reporting.
//!
//! Reports which résumé is being processed and how many are left while
//! `smx rank` runs. Progress is emitted on **stderr** so stdout stays
//! parseable for scripts.

use std::io::Write;

/// A single progress event for a ranking run.
#[derive(Clone, Debug, PartialEq)]
pub enum RankProgressEvent {
    /// Résumé `n` of `total` is being extracted and scored.
    Scoring { file: String, n: u64, total: u64 },
    /// A résumé could not be read; the batch continues.
    Failed { file: String, message: String },
    /// Batch finished.
    Done { scored: u64, failed: u64 },
}

/// Receives progress events from the ranking pipeline.
pub trait RankProgressReporter: Send + Sync {
    fn report(&self, event: RankProgressEvent);
}

/// Human-friendly progress on stderr: "rank  scoring  3 / 12  alice.pdf".
pub struct StderrProgress;

impl RankProgressReporter for StderrProgress {
    fn report(&self, event: RankProgressEvent) {
        let line = match &event {
            RankProgressEvent::Scoring { file, n, total } => format!(
                "rank  scoring  {} / {}  {}\n",
                format_number(*n),
                format_number(*total),
                file
            ),
            RankProgressEvent::Failed { file, message } => {
                format!("rank  skipped  {}: {}\n", file, message)
            }
            RankProgressEvent::Done { scored, failed } => format!(
                "rank  done  {} scored, {} failed\n",
                format_number(*scored),
                format_number(*failed)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl RankProgressReporter for JsonProgress {
    fn report(&self, event: RankProgressEvent) {
        let obj = match &event {
            RankProgressEvent::Scoring { file, n, total } => serde_json::json!({
                "event": "progress",
                "phase": "scoring",
                "file": file,
                "n": n,
                "total": total
            }),
            RankProgressEvent::Failed { file, message } => serde_json::json!({
                "event": "progress",
                "phase": "failed",
                "file": file,
                "message": message
            }),
            RankProgressEvent::Done { scored, failed } => serde_json::json!({
                "event": "progress",
                "phase": "done",
                "scored": scored,
                "failed": failed
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl RankProgressReporter for NoProgress {
    fn report(&self, _event: RankProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn RankProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
