use crate::domain::EmailRequest;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One undelivered message, stored as a single JSON line.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub id: String,
    pub saved_at: String,
    pub from_name: String,
    pub reply_to: String,
    pub message: String,
    pub to_name: String,
    pub status: u16,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("failed to write outbox {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("failed to read outbox {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to encode outbox record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

#[derive(Clone, Debug)]
pub struct Outbox {
    path: PathBuf,
}

impl Outbox {
    pub fn in_state_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("outbox.jsonl"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(
        &self,
        request: &EmailRequest,
        status: u16,
        reason: &str,
    ) -> Result<OutboxRecord, OutboxError> {
        let params = &request.template_params;
        let record = OutboxRecord {
            id: uuid::Uuid::now_v7().to_string(),
            saved_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
            from_name: params.from_name.clone(),
            reply_to: params.reply_to.clone(),
            message: params.message.clone(),
            to_name: params.to_name.clone(),
            status,
            reason: reason.to_string(),
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let write_error = |source| OutboxError::Write {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_error)?;
        file.write_all(line.as_bytes()).map_err(write_error)?;
        file.flush().map_err(write_error)?;

        Ok(record)
    }

    /// Malformed lines are skipped and counted.
    pub fn load(&self) -> Result<OutboxListing, OutboxError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(OutboxListing::default());
            }
            Err(source) => {
                return Err(OutboxError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        let mut listing = OutboxListing::default();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| OutboxError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<OutboxRecord>(&line) {
                Ok(record) => listing.records.push(record),
                Err(_) => listing.skipped += 1,
            }
        }
        Ok(listing)
    }
}

#[derive(Clone, Debug, Default)]
pub struct OutboxListing {
    pub records: Vec<OutboxRecord>,
    pub skipped: usize,
}
