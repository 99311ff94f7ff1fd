use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use chrono::NaiveDate;
use pulldown_cmark::{html, Options, Parser};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::ExportConfig;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF export is unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("PDF conversion timed out after {0} seconds")]
    Timeout(u64),
    #[error("PDF conversion failed: {0}")]
    PdfFailed(String),
}

/// Converts report markdown to an HTML fragment in-process, or to PDF through
/// an external Pandoc binary.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    pandoc_path: PathBuf,
    timeout: Duration,
}

impl ReportExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            pandoc_path: config.pandoc_path.clone(),
            timeout: config.timeout,
        }
    }

    pub fn to_html_fragment(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options);
        let mut body = String::new();
        html::push_html(&mut body, parser);
        body
    }

    async fn pandoc_available(&self) -> bool {
        Command::new(&self.pandoc_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub async fn to_pdf(&self, markdown: &str) -> Result<Vec<u8>, ExportError> {
        if !self.pandoc_available().await {
            return Err(ExportError::ServiceUnavailable(format!(
                "Pandoc was not found at '{}'",
                self.pandoc_path.display()
            )));
        }

        let mut child = Command::new(&self.pandoc_path)
            .args([
                "-f",
                "markdown",
                "-t",
                "pdf",
                "--pdf-engine=xelatex",
                "-V",
                "geometry:margin=1in",
                "-V",
                "fontsize=11pt",
                "-o",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExportError::PdfFailed(format!("failed to start Pandoc: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(markdown.as_bytes())
                .await
                .map_err(|e| ExportError::PdfFailed(format!("failed to write to Pandoc: {e}")))?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExportError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ExportError::PdfFailed(format!("Pandoc execution failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::PdfFailed(format!(
                "Pandoc returned error: {}",
                stderr.trim()
            )));
        }

        debug!(bytes = output.stdout.len(), "rendered PDF report");
        Ok(output.stdout)
    }
}

/// Attachment name for a user's report; characters outside `[A-Za-z0-9_-]`
/// become `_`.
pub fn pdf_filename(username: &str, date: NaiveDate) -> String {
    let safe: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("mbti-report_{}_{}.pdf", safe, date.format("%Y%m%d"))
}
