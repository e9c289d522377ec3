//! Built-in sample emails.

use async_trait::async_trait;

use crate::email::{Email, EmailSource};
use crate::error::PipelineError;

const SAMPLE_EMAILS: [&str; 3] = [
    r#"
        Subject: Server Downtime

        Hi Team,

        Our main production server is currently experiencing an outage. We need all hands on deck to investigate this immediately. Please check the incident channel in Teams for updates. We are working on a resolution.

        - John
        "#,
    r#"
        Subject: Project Status Update

        Hi All,

        This is a reminder that the Q3 project status report is due by end of business tomorrow. Please submit your individual updates to the shared drive.

        Thanks,
        Jane
        "#,
    r#"
        Subject: Weekend plans?

        Hey,

        Hope you're having a good week. What are your plans for the weekend? Thinking of checking out that new movie.

        - Alex
        "#,
];

/// Source returning the three fixed demo emails.
pub struct SampleEmailSource;

impl SampleEmailSource {
    pub fn new() -> Self {
        Self
    }

    /// The sample emails, without going through the async trait.
    pub fn emails() -> Vec<Email> {
        SAMPLE_EMAILS.iter().map(|raw| Email::from_raw(raw)).collect()
    }
}

impl Default for SampleEmailSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSource for SampleEmailSource {
    fn name(&self) -> &str {
        "samples"
    }

    async fn load(&self) -> Result<Vec<Email>, PipelineError> {
        Ok(Self::emails())
    }
}
