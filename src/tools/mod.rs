//! Tool system for function calling.

pub mod arguments;
pub mod dispatch;
pub mod pharmacy;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use dispatch::ToolDispatcher;
pub use pharmacy::PharmacyTool;
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool, ToolContext};
pub use types::ToolParameters;
