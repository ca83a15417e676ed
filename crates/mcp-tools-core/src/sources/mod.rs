//! Tool sources: one adapter per kind of external MCP server
//!
//! Each source knows how to find its own credentials, whether it can run in
//! the current environment, and how to connect and list its tools.

mod traits;
mod context7;

pub use traits::{
    Activation, ResolvedSourceConfig, SourceConnection, SourceEndpoint, SourceError,
    SourceResult, ToolSource,
};
pub use context7::Context7Source;
