//! Query and result types

use kaku_common::{KakuError, Result};
use serde::{Deserialize, Serialize};

/// Work search on `/search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: u32,
    pub ex_q: Option<String>,
    pub serial_status: Option<String>,
    pub genre_name: Option<String>,
    pub total_review_point_range: Option<String>,
    pub total_character_count_range: Option<String>,
    pub published_date_range: Option<String>,
    pub last_episode_published_date_range: Option<String>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            page: 1,
            ex_q: None,
            serial_status: None,
            genre_name: None,
            total_review_point_range: None,
            total_character_count_range: None,
            published_date_range: None,
            last_episode_published_date_range: None,
            limit: 10,
        }
    }

    /// Query string pairs: `q`, `page`, then every non-empty filter
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone()), ("page", self.page.to_string())];

        let optional = [
            ("ex_q", &self.ex_q),
            ("serial_status", &self.serial_status),
            ("genre_name", &self.genre_name),
            ("total_review_point_range", &self.total_review_point_range),
            ("total_character_count_range", &self.total_character_count_range),
            ("published_date_range", &self.published_date_range),
            (
                "last_episode_published_date_range",
                &self.last_episode_published_date_range,
            ),
        ];

        for (key, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((key, v.to_string()));
            }
        }

        params
    }
}

/// Ranking page `/rankings/{genre}/{period}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingQuery {
    pub genre: String,
    pub period: String,
    pub limit: usize,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            genre: "all".to_string(),
            period: "daily".to_string(),
            limit: 10,
        }
    }
}

/// One card scraped from a ranking page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub catchphrase: Option<String>,
    pub tags: Vec<String>,
    pub introduction: Option<String>,
}

/// Work and episode ids are numeric on the site; letters are tolerated
pub fn validate_id(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(KakuError::ValidationError(format!(
            "{} must be non-empty ASCII alphanumerics, got {:?}",
            kind, value
        )));
    }
    Ok(())
}

/// Path segments such as ranking genre and period
pub fn validate_segment(kind: &str, value: &str) -> Result<()> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(KakuError::ValidationError(format!(
            "{} must be ASCII alphanumerics, '-' or '_', got {:?}",
            kind, value
        )));
    }
    Ok(())
}
