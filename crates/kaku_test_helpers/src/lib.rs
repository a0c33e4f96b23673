//! Shared test utilities for the Kakuyomu MCP test suites
//!
//! # Modules
//!
//! - [`fixtures`]: HTML pages shaped like the site's markup
//! - [`site`]: a `wiremock` server standing in for the site
//! - [`cli`]: Command builders with pre-configured environments
//! - [`logging`]: Test logging configuration
//! - [`assertions`]: Domain-specific assertion helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use kaku_test_helpers::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() {
//! let site = MockSite::start().await;
//! site.page("/", next_data_page(&json!({"Work:1": {"title": "A"}}))).await;
//! // point the client at site.url()
//! # }
//! ```

pub mod assertions;
pub mod cli;
pub mod fixtures;
pub mod logging;
pub mod site;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::cli::{command_for, kaku_command, mcp_command};
    pub use crate::fixtures::{episode_page, next_data_page, ranking_card, ranking_page};
    pub use crate::logging::{init_test_logging, suppress_logs};
    pub use crate::site::MockSite;
}
