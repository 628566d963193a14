use crate::core::ReportSink;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Filesystem-backed report sink.
#[derive(Debug, Clone)]
pub struct LocalReportStore {
    base_path: String,
}

impl LocalReportStore {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl ReportSink for LocalReportStore {
    async fn write_report(&self, name: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(name);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_report_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("reports");
        let store = LocalReportStore::new(base.to_str().unwrap().to_string());

        store
            .write_report("forrester_report.json", b"{}")
            .await
            .unwrap();

        let written = fs::read(base.join("forrester_report.json")).unwrap();
        assert_eq!(written, b"{}");
    }
}
