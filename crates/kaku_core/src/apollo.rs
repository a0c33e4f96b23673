//! Apollo cache extraction
//!
//! Kakuyomu pages are server-rendered by Next.js. The GraphQL cache that
//! hydrates the page is embedded as JSON in `<script id="__NEXT_DATA__">`
//! under `props.pageProps.__APOLLO_STATE__`. Entries are keyed by
//! `Typename:id` (`Work:1177354054880238351`, `Episode:…`).

use crate::html::selector;
use kaku_common::{KakuError, Result};
use scraper::Html;
use serde_json::{Map, Value};

/// Apollo cache entries in payload order
pub type ApolloState = Map<String, Value>;

/// Locate `__NEXT_DATA__` and return its Apollo state
pub fn parse_apollo_state(html: &str) -> Result<ApolloState> {
    let document = Html::parse_document(html);
    let script_sel = selector("script#__NEXT_DATA__")?;

    let script = document
        .select(&script_sel)
        .next()
        .ok_or(KakuError::MissingNextData)?;

    let raw: String = script.text().collect();
    let data: Value = serde_json::from_str(&raw)?;

    match data.pointer("/props/pageProps/__APOLLO_STATE__") {
        Some(Value::Object(state)) => Ok(state.clone()),
        _ => Err(KakuError::MissingApolloState),
    }
}

/// Cache keys starting with `prefix`, in payload order
pub fn keys_with_prefix<'a>(state: &'a ApolloState, prefix: &str) -> Vec<&'a str> {
    state
        .keys()
        .filter(|key| key.starts_with(prefix))
        .map(String::as_str)
        .collect()
}
