//! Core engine for reading Kakuyomu pages
//!
//! Every operation is one GET against the site followed by extraction and
//! plain-text rendering:
//!
//! - [`apollo`]: `__NEXT_DATA__` → Apollo cache map
//! - [`episode`]: episode body paragraphs
//! - [`ranking`]: ranking page cards
//! - [`format`]: text rendering for works, episodes and rankings
//! - [`client`]: HTTP access and the high-level operations

pub mod apollo;
pub mod client;
pub mod episode;
pub mod format;
pub mod model;
pub mod ranking;

mod html;

pub use apollo::{keys_with_prefix, parse_apollo_state, ApolloState};
pub use client::KakuyomuClient;
pub use model::{validate_id, validate_segment, RankingEntry, RankingQuery, SearchQuery};

/// Returned by episode content when the page has no body container
pub const EPISODE_BODY_NOT_FOUND: &str = "エピソードの本文が見つかりませんでした。";

/// Apollo key prefix for works on the top page
pub const TOP_PAGE_WORK_PREFIX: &str = "Work";
/// Apollo key prefix for works on search results
pub const SEARCH_WORK_PREFIX: &str = "Work:";
/// Apollo key prefix for episodes on a work page
pub const EPISODE_PREFIX: &str = "Episode:";
