use std::{fmt, path::Path};

use chrono::{Local, Utc};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::{info, warn};

extern crate strip_ansi_escapes;

use crate::Result;

#[derive(Debug, Default)]
struct Tally {
    skipped: usize,
    updated: usize,
    new: usize,
    err: usize,
    log: Vec<String>,
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipped \x1b[33m{}\x1b[0m / Updated \x1b[34m{}\x1b[0m / New \x1b[32m{}\x1b[0m / Err \x1b[31m{}\x1b[0m",
            self.skipped, self.updated, self.new, self.err
        )
    }
}

impl Tally {
    fn create_log_entry(&mut self, message: &str, log_type: &str) -> String {
        // Create log entry contents for both tracing and log file
        let log_entry_contents = format!("{}{}", log_type, message);

        // Create entry for log file
        self.log
            .push(format!("{} {}", get_current_time(), log_entry_contents));

        log_entry_contents
    }
}

fn get_current_time() -> String {
    Utc::now().with_timezone(&Local).to_rfc3339()
}

/// Collects the outcome of a run, safe to share between download workers
#[derive(Debug, Default)]
pub struct StatusBar {
    tally: Mutex<Tally>,
}

impl StatusBar {
    pub async fn register_skipped(&self, count: usize) {
        self.tally.lock().await.skipped += count;
    }
    pub async fn register_updated(&self, message: &str) {
        let mut tally = self.tally.lock().await;
        tally.updated += 1;
        let entry = tally.create_log_entry(message, "\x1b[34mUpdated\x1b[0m: ");
        info!("{}", entry);
    }
    pub async fn register_new(&self, message: &str) {
        let mut tally = self.tally.lock().await;
        tally.new += 1;
        let entry = tally.create_log_entry(message, "\x1b[32mNew\x1b[0m: ");
        info!("{}", entry);
    }
    pub async fn register_err(&self, message: &str) {
        let mut tally = self.tally.lock().await;
        tally.err += 1;
        let entry = tally.create_log_entry(message, "\x1b[31mErr\x1b[0m: ");
        warn!("{}", entry);
    }

    /// Number of failed downloads so far
    pub async fn errors(&self) -> usize {
        self.tally.lock().await.err
    }

    pub async fn summary(&self) -> String {
        self.tally.lock().await.to_string()
    }

    pub async fn print_summary(&self) {
        info!("Total: {}", self.summary().await);
    }

    // Appends the log to a log file
    pub async fn write_log_to_file(&self, file_path: &Path) -> Result<()> {
        let tally = self.tally.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .await?;

        let mut buffer = Vec::new();

        for log_entry in &tally.log {
            buffer.extend_from_slice(&strip_ansi_escapes::strip(log_entry.as_bytes()));
            buffer.extend_from_slice(b"\n");
        }

        buffer.extend_from_slice(b"Total: ");
        buffer.extend_from_slice(&strip_ansi_escapes::strip(tally.to_string().as_bytes()));
        buffer.extend_from_slice(b"     (Log generated at: ");
        buffer.extend_from_slice(get_current_time().as_bytes());
        buffer.extend_from_slice(b")\n\n");

        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}
