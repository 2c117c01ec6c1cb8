use crate::models::entry::Entry;
use crate::models::user::UserRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// One logged mutation, stored as a single JSON line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalOperation {
    InsertUser { user: UserRecord },
    DeleteUser { id: String },
    InsertEntry { entry: Entry },
}

impl WalOperation {
    fn to_line(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode WAL operation")
    }

    fn from_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("Failed to decode WAL operation")
    }
}

pub struct Wal {
    file: Mutex<File>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context(format!("Failed to open WAL file: {}", path.display()))?;

        Ok(Wal {
            file: Mutex::new(file),
            path,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn log_operation(&self, op: &WalOperation) -> Result<()> {
        let line = op.to_line()?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("WAL lock poisoned"))?;
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match WalOperation::from_line(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse WAL line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }

    /// Replace the whole log with `operations`.
    /// Written to a sibling file first, then renamed over the log.
    pub fn rewrite(&self, operations: &[WalOperation]) -> Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("WAL lock poisoned"))?;

        let tmp_path = self.path.with_extension("wal.tmp");
        {
            let mut tmp = File::create(&tmp_path)
                .context(format!("Failed to create {}", tmp_path.display()))?;
            for op in operations {
                writeln!(tmp, "{}", op.to_line()?).context("Failed to write compacted WAL")?;
            }
            tmp.sync_all().context("Failed to sync compacted WAL")?;
        }

        std::fs::rename(&tmp_path, &self.path).context("Failed to replace WAL")?;

        *file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to reopen WAL")?;

        Ok(())
    }
}
