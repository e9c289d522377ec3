//! Tool abstraction for agent capabilities.

pub mod builtin;
pub mod effects;
pub mod registry;
pub mod tool;

pub use effects::{EffectLog, EffectRecord, ToolEffect};
pub use registry::ToolRegistry;
pub use tool::*;
