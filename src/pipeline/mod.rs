//! Email triage pipeline.
//!
//! Every email flows through:
//! 1. `Summarizer::summarize()` — a few-sentence summary
//! 2. `Classifier::classify()` — Urgent / Important / General
//! 3. `ActionRouter::route()` — category → agent directive
//! 4. `ActionAgent::run()` — tool-calling loop that performs the action
//!
//! `Orchestrator` drives the stages sequentially and collects a `TriageReport`.

pub mod classifier;
pub mod orchestrator;
pub mod router;
pub mod summarizer;
pub mod types;

pub use classifier::Classifier;
pub use orchestrator::Orchestrator;
pub use router::ActionRouter;
pub use summarizer::Summarizer;
pub use types::{
    Category, Classification, EmailReport, Stage, TriageRecord, TriageReport, TriageStatus,
};
