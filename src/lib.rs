//! Email Triage — summarize, classify and act on emails with a language model.

pub mod agent;
pub mod config;
pub mod email;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod tools;
