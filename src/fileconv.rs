//! File conversion as a pluggable capability (§6, §9). Spreadsheet and
//! document converters are external collaborators — this crate only defines
//! the trait and ships a text-passthrough implementation.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "csv", "json", "yaml", "yml", "log"];

/// "Bytes in, text out, bounded by a timeout." Implementations that cannot
/// handle an extension return `Ok(None)` so the orchestrator can try the
/// next converter in its chain.
#[async_trait]
pub trait FileConverter: Send + Sync {
    async fn try_convert(&self, path: &Path, timeout: Duration) -> Option<String>;
}

/// Reads already-text extensions directly. The only converter this crate
/// ships; spreadsheet/document converters are supplied by the host.
pub struct TextPassthroughConverter;

#[async_trait]
impl FileConverter for TextPassthroughConverter {
    async fn try_convert(&self, path: &Path, timeout: Duration) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        tokio::time::timeout(timeout, tokio::fs::read_to_string(path))
            .await
            .ok()?
            .ok()
    }
}

/// Tries each converter in order, returning the first successful result.
pub struct ConverterChain {
    converters: Vec<Box<dyn FileConverter>>,
}

impl ConverterChain {
    pub fn new() -> Self {
        Self {
            converters: vec![Box::new(TextPassthroughConverter)],
        }
    }

    pub fn with_converter(mut self, converter: Box<dyn FileConverter>) -> Self {
        self.converters.push(converter);
        self
    }

    /// `try_read_referenced_file(path) -> option<text>`.
    pub async fn try_read(&self, path: &Path) -> Option<String> {
        for converter in &self.converters {
            if let Some(text) = converter.try_convert(path, DEFAULT_TIMEOUT).await {
                return Some(text);
            }
        }
        None
    }
}

impl Default for ConverterChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_passthrough_reads_recognized_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "hello world").await.unwrap();

        let chain = ConverterChain::new();
        let result = chain.try_read(&path).await;
        assert_eq!(result.as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn unrecognized_extension_falls_through_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        tokio::fs::write(&path, b"not really an xlsx").await.unwrap();

        let chain = ConverterChain::new();
        assert!(chain.try_read(&path).await.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_treated_as_unreadable() {
        let chain = ConverterChain::new();
        let result = chain.try_read(Path::new("/nonexistent/file.txt")).await;
        assert!(result.is_none());
    }
}
