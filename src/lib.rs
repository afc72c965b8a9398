pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod mcp;
pub mod model;
pub mod routing;
pub mod upstream;

pub use error::{NmdcError, Result};
