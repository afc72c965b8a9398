pub mod client;
pub mod filter;
#[cfg(test)]
pub(crate) mod memory;
pub mod traits;
pub mod types;

pub use client::NmdcClient;
pub use filter::{Clause, QueryFilter};
pub use traits::RecordSource;
pub use types::{Page, PageRequest, collections};
