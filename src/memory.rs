//! Memory Manager (C8): two memory files plus two memory directories;
//! end-of-session projection from full to clean.

use crate::error::{PrivacyError, Result};
use crate::privacy::{redact, redact_fallback, PrivacyEntity};
use chrono::Utc;
use std::path::PathBuf;

const GUARD_MARKERS: &[&str] = &["[guard agent]", "guard:", "private context:"];

/// Selects between the "clean" and "full" memory surfaces under a workspace.
pub struct MemoryManager {
    workspace: PathBuf,
}

impl MemoryManager {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    fn memory_file(&self, is_cloud: bool) -> PathBuf {
        if is_cloud {
            self.workspace.join("MEMORY.md")
        } else {
            self.workspace.join("MEMORY-FULL.md")
        }
    }

    fn memory_dir(&self, is_cloud: bool) -> PathBuf {
        if is_cloud {
            self.workspace.join("memory")
        } else {
            self.workspace.join("memory-full")
        }
    }

    /// `initialize_directories()`.
    pub async fn initialize_directories(&self) -> Result<()> {
        for is_cloud in [true, false] {
            tokio::fs::create_dir_all(self.memory_dir(is_cloud))
                .await
                .map_err(|e| PrivacyError::StorageWriteError(e.to_string()))?;
        }
        Ok(())
    }

    /// `write_memory(content, is_cloud, opts)`. Writes to the daily dated
    /// entry (`YYYY-MM-DD.md`) under the appropriate directory, and appends
    /// to the flat memory file.
    pub async fn write_memory(&self, content: &str, is_cloud: bool) -> Result<()> {
        self.initialize_directories().await?;

        let dated_path = self
            .memory_dir(is_cloud)
            .join(format!("{}.md", Utc::now().format("%Y-%m-%d")));
        append_to_file(&dated_path, content).await?;
        append_to_file(&self.memory_file(is_cloud), content).await?;
        Ok(())
    }

    /// `read_memory(is_cloud, opts)`.
    pub async fn read_memory(&self, is_cloud: bool) -> Result<String> {
        let path = self.memory_file(is_cloud);
        if !path.exists() {
            return Ok(String::new());
        }
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PrivacyError::FileReadError(e.to_string()))
    }

    /// `sync_full_to_clean()`: reads the full memory, strips guard-marker
    /// blocks, redacts residual entities, and writes the result to the clean
    /// memory file.
    pub async fn sync_full_to_clean(&self, entities: &[PrivacyEntity], model_available: bool) -> Result<String> {
        let full = self.read_memory(false).await?;
        let filtered = strip_guard_blocks(&full);
        let redacted = if model_available {
            redact(&filtered, entities)
        } else {
            redact_fallback(&filtered)
        };

        tokio::fs::write(self.memory_file(true), &redacted)
            .await
            .map_err(|e| PrivacyError::StorageWriteError(e.to_string()))?;
        Ok(redacted)
    }
}

async fn append_to_file(path: &std::path::Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PrivacyError::StorageWriteError(e.to_string()))?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| PrivacyError::StorageWriteError(e.to_string()))?;
    use tokio::io::AsyncWriteExt;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| PrivacyError::StorageWriteError(e.to_string()))?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")
            .await
            .map_err(|e| PrivacyError::StorageWriteError(e.to_string()))?;
    }
    Ok(())
}

/// Removes any line containing a guard marker (case-insensitive), dropping
/// the surrounding block until the next blank line or markdown header.
fn strip_guard_blocks(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let lower = line.to_lowercase();
        if GUARD_MARKERS.iter().any(|m| lower.contains(m)) {
            // Skip forward until a blank line or header, dropping this block.
            i += 1;
            while i < lines.len() && !lines[i].trim().is_empty() && !lines[i].trim_start().starts_with('#') {
                i += 1;
            }
            continue;
        }
        out.push(line);
        i += 1;
    }
    out.join("\n")
}
