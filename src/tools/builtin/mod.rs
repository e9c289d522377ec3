//! Built-in triage tools.

mod archive;
mod notify;
mod task;

pub use archive::ArchiveTool;
pub use notify::NotifyTool;
pub use task::AddTaskTool;
