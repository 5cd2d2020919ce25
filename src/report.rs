use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// One submitted result: who played, what they scored, and when.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ScoreEntry {
    pub recorded_at: DateTime<Local>,
    pub player: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(player: String, score: u32) -> Self {
        Self {
            recorded_at: Local::now(),
            player,
            score,
        }
    }
}

/// Destination for final scores. Implementations must tolerate being called
/// from a detached thread; errors are the caller's to log, never to retry.
pub trait ReportSink: Send + Sync {
    fn submit(&self, entry: &ScoreEntry) -> io::Result<()>;
}

/// Appends scores to a CSV file, writing the header row on first use.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "credguard") {
            pd.data_dir().join("scores.csv")
        } else {
            PathBuf::from("credguard_scores.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for CsvSink {
    fn submit(&self, entry: &ScoreEntry) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer
            .serialize(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writer.flush()
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: std::sync::Mutex<Vec<ScoreEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl ReportSink for MemorySink {
    fn submit(&self, entry: &ScoreEntry) -> io::Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Sink that always fails; used to verify failures stay out of the game.
#[derive(Debug, Default)]
pub struct FailingSink;

impl ReportSink for FailingSink {
    fn submit(&self, _entry: &ScoreEntry) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "sink unavailable"))
    }
}

/// Fire-and-forget submission. Failures are logged and dropped; the caller
/// never waits on the result.
pub fn submit_detached(sink: Arc<dyn ReportSink>, entry: ScoreEntry) {
    thread::spawn(move || {
        if let Err(err) = sink.submit(&entry) {
            eprintln!("score submission failed: {err}");
        }
    });
}
