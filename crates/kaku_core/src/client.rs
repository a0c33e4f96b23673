//! HTTP access to Kakuyomu and the high-level read operations

use crate::apollo::{keys_with_prefix, parse_apollo_state, ApolloState};
use crate::episode::extract_body;
use crate::format::{episodes_to_string, rankings_to_string, works_to_string};
use crate::model::{validate_id, validate_segment, RankingQuery, SearchQuery};
use crate::ranking::parse_rankings;
use crate::{EPISODE_BODY_NOT_FOUND, EPISODE_PREFIX, SEARCH_WORK_PREFIX, TOP_PAGE_WORK_PREFIX};
use kaku_common::{KakuError, Result};
use kaku_config::HttpConfig;
use std::time::Duration;

/// Client for one Kakuyomu origin
///
/// Holds a single pooled `reqwest::Client`; cheap to clone.
#[derive(Debug, Clone)]
pub struct KakuyomuClient {
    http: reqwest::Client,
    base_url: String,
}

impl KakuyomuClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KakuError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` (relative to the base URL) and return the body text
    pub async fn fetch_html(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = params.len(), "Fetching page");

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| KakuError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KakuError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| KakuError::Network(format!("Failed to read response body: {}", e)))
    }

    /// Fetch a page and return its Apollo cache
    pub async fn fetch_apollo(&self, path: &str, params: &[(&str, String)]) -> Result<ApolloState> {
        let html = self.fetch_html(path, params).await?;
        parse_apollo_state(&html)
    }

    /// Latest works on the top page
    pub async fn top_page(&self, limit: usize) -> Result<String> {
        let state = self.fetch_apollo("/", &[]).await?;
        Ok(render_works(&state, TOP_PAGE_WORK_PREFIX, limit))
    }

    /// Search works
    pub async fn search_works(&self, query: &SearchQuery) -> Result<String> {
        let state = self.fetch_apollo("/search", &query.to_params()).await?;
        Ok(render_works(&state, SEARCH_WORK_PREFIX, query.limit))
    }

    /// Episode list of a work
    pub async fn work_episodes(&self, work_id: &str, limit: usize) -> Result<String> {
        validate_id("work_id", work_id)?;

        let state = self.fetch_apollo(&format!("/works/{}", work_id), &[]).await?;
        let keys: Vec<&str> = keys_with_prefix(&state, EPISODE_PREFIX)
            .into_iter()
            .take(limit)
            .collect();
        Ok(episodes_to_string(&state, &keys))
    }

    /// Body text of one episode, one paragraph per line
    pub async fn episode_content(&self, work_id: &str, episode_id: &str) -> Result<String> {
        validate_id("work_id", work_id)?;
        validate_id("episode_id", episode_id)?;

        let html = self
            .fetch_html(&format!("/works/{}/episodes/{}", work_id, episode_id), &[])
            .await?;

        match extract_body(&html)? {
            Some(paragraphs) => Ok(paragraphs.join("\n")),
            None => {
                tracing::warn!(work_id, episode_id, "Episode body container not found");
                Ok(EPISODE_BODY_NOT_FOUND.to_string())
            }
        }
    }

    /// Ranking cards for a genre and period
    pub async fn rankings(&self, query: &RankingQuery) -> Result<String> {
        validate_segment("genre", &query.genre)?;
        validate_segment("period", &query.period)?;

        let html = self
            .fetch_html(&format!("/rankings/{}/{}", query.genre, query.period), &[])
            .await?;
        let rankings = parse_rankings(&html, query.limit)?;
        Ok(rankings_to_string(&rankings))
    }
}

fn render_works(state: &ApolloState, prefix: &str, limit: usize) -> String {
    let keys: Vec<&str> = keys_with_prefix(state, prefix)
        .into_iter()
        .take(limit)
        .collect();
    works_to_string(state, &keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = HttpConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let client = KakuyomuClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_invalid_ids_rejected_before_request() {
        // Port 9 (discard) is never contacted: validation fails first
        let config = HttpConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = KakuyomuClient::new(&config).unwrap();

        let err = client.work_episodes("../etc", 5).await.unwrap_err();
        assert!(matches!(err, KakuError::ValidationError(_)));

        let err = client.episode_content("1", "2/3").await.unwrap_err();
        assert!(matches!(err, KakuError::ValidationError(_)));

        let query = RankingQuery {
            genre: "all?".to_string(),
            ..Default::default()
        };
        let err = client.rankings(&query).await.unwrap_err();
        assert!(matches!(err, KakuError::ValidationError(_)));
    }
}
