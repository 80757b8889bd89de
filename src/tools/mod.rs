//! Tool system: the `Tool` trait, argument helpers, and the registry that
//! executes tools on behalf of the engine.

pub mod arguments;
pub mod registry;
pub mod result;
pub mod tool;
pub mod types;

#[cfg(feature = "builtin-tools")]
pub mod builtin;

pub use arguments::ToolArguments;
pub use registry::ToolRegistry;
pub use result::ToolResult;
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
