//! Directory of RFC 822 `.eml` files as an email source.

use std::path::PathBuf;

use async_trait::async_trait;
use mail_parser::MessageParser;
use tracing::{debug, warn};

use crate::email::{Email, EmailSource, NO_SUBJECT};
use crate::error::PipelineError;

/// Loads every `*.eml` file in a directory, ordered by file name.
///
/// Files that fail to parse are skipped with a warning.
pub struct EmlDirectorySource {
    dir: PathBuf,
}

impl EmlDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn source_error(&self, reason: impl std::fmt::Display) -> PipelineError {
        PipelineError::Source {
            source_name: self.name().to_string(),
            reason: format!("{}: {reason}", self.dir.display()),
        }
    }
}

#[async_trait]
impl EmailSource for EmlDirectorySource {
    fn name(&self) -> &str {
        "eml-dir"
    }

    async fn load(&self) -> Result<Vec<Email>, PipelineError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.source_error(e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.source_error(e))?
        {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
            {
                paths.push(path);
            }
        }
        paths.sort();

        let mut emails = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable email file");
                    continue;
                }
            };
            match parse_eml(&raw) {
                Some(email) => {
                    debug!(path = %path.display(), subject = %email.subject, "Loaded email");
                    emails.push(email);
                }
                None => warn!(path = %path.display(), "Skipping unparseable email file"),
            }
        }

        Ok(emails)
    }
}

/// Parse raw RFC 822 bytes into an `Email` whose body carries a leading
/// `Subject:` line, the same shape the samples use.
fn parse_eml(raw: &[u8]) -> Option<Email> {
    let parsed = MessageParser::default().parse(raw)?;
    let subject = parsed
        .subject()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUBJECT)
        .to_string();
    let text = parsed
        .body_text(0)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    let body = format!("Subject: {subject}\n\n{text}");
    Some(Email { subject, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTAGE: &str = "From: ops@example.com\r\n\
        To: team@example.com\r\n\
        Subject: Database outage\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        The primary database is down. Please respond immediately.\r\n";

    #[test]
    fn parse_eml_extracts_subject_and_text() {
        let email = parse_eml(OUTAGE.as_bytes()).unwrap();
        assert_eq!(email.subject, "Database outage");
        assert!(email.body.starts_with("Subject: Database outage\n\n"));
        assert!(email.body.contains("primary database is down"));
    }

    #[tokio::test]
    async fn load_reads_sorted_eml_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.eml"), OUTAGE).unwrap();
        std::fs::write(
            dir.path().join("a.eml"),
            "Subject: Lunch\r\n\r\nPizza on Friday?\r\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an email").unwrap();

        let source = EmlDirectorySource::new(dir.path());
        let emails = source.load().await.unwrap();

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].subject, "Lunch");
        assert_eq!(emails[1].subject, "Database outage");
    }

    #[tokio::test]
    async fn missing_directory_is_source_error() {
        let source = EmlDirectorySource::new("/nonexistent/email-triage-test");
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, PipelineError::Source { .. }));
    }
}
