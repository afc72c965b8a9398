pub mod args;
pub mod registry;
pub mod server;
pub mod tools;
pub mod types;

pub use args::ToolArguments;
pub use registry::ToolRegistry;
pub use server::NmdcServer;
pub use types::{ToolCallRequest, ToolDefinition};
