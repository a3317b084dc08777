use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::{Booking, BookingId, LedgerEntry};

use super::LedgerFormat;
use super::format::{
    format_booking_json, format_booking_line, parse_booking_json, parse_booking_line,
};

/// Append-mostly file of bookings, one per line.
///
/// Blank lines are ignored and dropped on rewrite. Every other line keeps its
/// exact text across `replace_at`/`remove_at`.
#[derive(Debug, Clone)]
pub struct BookingLedger {
    path: PathBuf,
    format: LedgerFormat,
}

impl BookingLedger {
    pub fn new(path: impl Into<PathBuf>, format: LedgerFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LedgerFormat {
        self.format
    }

    /// Render a booking as a ledger line in this ledger's format.
    pub fn format_line(&self, booking: &Booking) -> Result<String> {
        match self.format {
            LedgerFormat::Text => Ok(format_booking_line(booking)),
            LedgerFormat::Jsonl => format_booking_json(booking),
        }
    }

    fn parse_line(&self, line: &str) -> Option<Booking> {
        match self.format {
            LedgerFormat::Text => parse_booking_line(line),
            LedgerFormat::Jsonl => parse_booking_json(line),
        }
    }

    /// Read the file, treating a missing one as empty.
    async fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Bookings file not found, treating as empty");
                Ok(String::new())
            }
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read bookings file: {}", self.path.display())
            }),
        }
    }

    /// Non-blank lines without their `\n`. A `\r` before it stays part of the
    /// line so CRLF files are rewritten unchanged.
    async fn read_lines(&self) -> Result<Vec<String>> {
        let content = self.read().await?;
        Ok(content
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Rewrite the whole file through a temporary sibling and a rename.
    async fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to rewrite bookings file: {}", self.path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace bookings file: {}", self.path.display()))
    }

    fn entry(&self, position: usize, raw: &str) -> LedgerEntry {
        let line = raw.strip_suffix('\r').unwrap_or(raw).to_string();
        let booking = self.parse_line(&line);
        LedgerEntry {
            position,
            line,
            booking,
        }
    }

    /// Append a booking and return the entry it became.
    pub async fn append(&self, booking: &Booking) -> Result<LedgerEntry> {
        let line = self.format_line(booking)?;
        let existing = self.read().await?;
        let position = existing
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count();

        let mut payload = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            payload.push('\n');
        }
        payload.push_str(&line);
        payload.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open bookings file: {}", self.path.display()))?;
        file.write_all(payload.as_bytes())
            .await
            .context("Failed to append booking")?;
        file.flush().await.context("Failed to append booking")?;

        debug!(position, "Appended booking line");
        Ok(LedgerEntry {
            position,
            line,
            booking: Some(booking.clone()),
        })
    }

    /// Read every booking in file order. Unreadable lines are kept as entries
    /// without a booking.
    pub async fn load_all(&self) -> Result<Vec<LedgerEntry>> {
        let lines = self.read_lines().await?;

        Ok(lines
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                let entry = self.entry(position, raw);
                if entry.booking.is_none() {
                    warn!(position, line = %entry.line, "Unreadable booking line");
                }
                entry
            })
            .collect())
    }

    /// Replace the line at `position`. Returns the entry that was replaced.
    pub async fn replace_at(&self, position: usize, new_line: String) -> Result<LedgerEntry> {
        let mut lines = self.read_lines().await?;
        if position >= lines.len() {
            bail!(
                "Booking position {} is out of range ({} bookings)",
                position,
                lines.len()
            );
        }

        let old = std::mem::replace(&mut lines[position], new_line);
        self.write_lines(&lines).await?;

        Ok(self.entry(position, &old))
    }

    /// Remove the line at `position`. Later lines keep their relative order.
    pub async fn remove_at(&self, position: usize) -> Result<LedgerEntry> {
        let mut lines = self.read_lines().await?;
        if position >= lines.len() {
            bail!(
                "Booking position {} is out of range ({} bookings)",
                position,
                lines.len()
            );
        }

        let removed = lines.remove(position);
        self.write_lines(&lines).await?;

        Ok(self.entry(position, &removed))
    }

    /// Find a booking by its stable id. Text ledgers carry no ids, so this
    /// never matches there.
    pub async fn find_by_id(&self, id: BookingId) -> Result<Option<LedgerEntry>> {
        let entries = self.load_all().await?;
        Ok(entries.into_iter().find(|entry| {
            entry
                .booking
                .as_ref()
                .is_some_and(|booking| booking.id == Some(id))
        }))
    }
}
