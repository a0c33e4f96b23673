//! MCP tool handlers
//!
//! Each tool is one read against the site rendered as text. Failures while
//! talking to the site are reported inside the tool result (`isError`) so
//! the model sees them; malformed arguments are JSON-RPC errors.

use crate::{JsonRpcError, McpServer};
use kaku_common::Result;
use kaku_core::{validate_id, validate_segment, RankingQuery, SearchQuery};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Prefix of the text returned when a tool fails
pub const ERROR_PREFIX: &str = "エラーが発生しました: ";

/// Tools exposed over MCP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetTopPage,
    SearchWorks,
    GetWorkEpisodes,
    GetEpisodeContent,
    GetRankings,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::GetTopPage,
        Tool::SearchWorks,
        Tool::GetWorkEpisodes,
        Tool::GetEpisodeContent,
        Tool::GetRankings,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::GetTopPage => "get_top_page",
            Tool::SearchWorks => "search_works",
            Tool::GetWorkEpisodes => "get_work_episodes",
            Tool::GetEpisodeContent => "get_episode_content",
            Tool::GetRankings => "get_rankings",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::GetTopPage => "カクヨムのトップページから最新作品一覧を取得",
            Tool::SearchWorks => "カクヨムで作品を検索",
            Tool::GetWorkEpisodes => "特定の作品のエピソード一覧を取得",
            Tool::GetEpisodeContent => "特定のエピソードの本文を取得",
            Tool::GetRankings => "カクヨムのランキングページから作品ランキングを取得",
        }
    }

    pub fn input_schema(self) -> Value {
        let schema = match self {
            Tool::GetTopPage => schemars::schema_for!(TopPageArgs),
            Tool::SearchWorks => schemars::schema_for!(SearchWorksArgs),
            Tool::GetWorkEpisodes => schemars::schema_for!(WorkEpisodesArgs),
            Tool::GetEpisodeContent => schemars::schema_for!(EpisodeContentArgs),
            Tool::GetRankings => schemars::schema_for!(RankingsArgs),
        };
        serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }))
    }
}

/// `tools/list` entries
pub fn tool_definitions() -> Vec<Value> {
    Tool::ALL
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "inputSchema": tool.input_schema()
            })
        })
        .collect()
}

/// Arguments of `get_top_page`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TopPageArgs {
    /// Maximum number of works (default 10)
    pub limit: Option<usize>,
}

/// Arguments of `search_works`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchWorksArgs {
    /// Search keywords
    pub q: String,
    /// Result page, starting at 1
    pub page: Option<u32>,
    /// Keywords to exclude
    pub ex_q: Option<String>,
    /// Serial status filter, e.g. "running" or "completed"
    pub serial_status: Option<String>,
    /// Genre filter, e.g. "fantasy"
    pub genre_name: Option<String>,
    /// Total review point range
    pub total_review_point_range: Option<String>,
    /// Total character count range
    pub total_character_count_range: Option<String>,
    /// Published date range
    pub published_date_range: Option<String>,
    /// Last episode published date range
    pub last_episode_published_date_range: Option<String>,
    /// Maximum number of works (default 10)
    pub limit: Option<usize>,
}

/// Arguments of `get_work_episodes`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkEpisodesArgs {
    /// Work id, e.g. "1177354054880238351"
    pub work_id: String,
    /// Maximum number of episodes (default 20)
    pub limit: Option<usize>,
}

/// Arguments of `get_episode_content`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EpisodeContentArgs {
    /// Work id
    pub work_id: String,
    /// Episode id
    pub episode_id: String,
}

/// Arguments of `get_rankings`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RankingsArgs {
    /// Genre slug (default "all")
    pub genre: Option<String>,
    /// Period: daily, weekly, monthly, yearly or entire (default "daily")
    pub period: Option<String>,
    /// Maximum number of works (default 10)
    pub limit: Option<usize>,
}

/// Result of one tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn into_value(self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error
        })
    }
}

/// Arguments of one call, parsed for its tool
#[derive(Debug)]
enum ToolCall {
    TopPage(TopPageArgs),
    SearchWorks(SearchWorksArgs),
    WorkEpisodes(WorkEpisodesArgs),
    EpisodeContent(EpisodeContentArgs),
    Rankings(RankingsArgs),
}

impl ToolCall {
    fn parse(tool: Tool, arguments: Value) -> std::result::Result<Self, JsonRpcError> {
        Ok(match tool {
            Tool::GetTopPage => ToolCall::TopPage(parse_args(arguments, true)?),
            Tool::SearchWorks => ToolCall::SearchWorks(parse_args(arguments, false)?),
            Tool::GetWorkEpisodes => ToolCall::WorkEpisodes(parse_args(arguments, false)?),
            Tool::GetEpisodeContent => ToolCall::EpisodeContent(parse_args(arguments, false)?),
            Tool::GetRankings => ToolCall::Rankings(parse_args(arguments, true)?),
        })
    }

    /// Reject ids that would change the requested path
    fn validate(&self) -> Result<()> {
        match self {
            ToolCall::TopPage(_) | ToolCall::SearchWorks(_) => Ok(()),
            ToolCall::WorkEpisodes(args) => validate_id("work_id", &args.work_id),
            ToolCall::EpisodeContent(args) => {
                validate_id("work_id", &args.work_id)?;
                validate_id("episode_id", &args.episode_id)
            }
            ToolCall::Rankings(args) => {
                if let Some(genre) = &args.genre {
                    validate_segment("genre", genre)?;
                }
                if let Some(period) = &args.period {
                    validate_segment("period", period)?;
                }
                Ok(())
            }
        }
    }

    async fn run(self, server: &McpServer) -> Result<String> {
        match self {
            ToolCall::TopPage(args) => get_top_page(server, args).await,
            ToolCall::SearchWorks(args) => search_works(server, args).await,
            ToolCall::WorkEpisodes(args) => get_work_episodes(server, args).await,
            ToolCall::EpisodeContent(args) => get_episode_content(server, args).await,
            ToolCall::Rankings(args) => get_rankings(server, args).await,
        }
    }
}

/// Run `tool` with raw JSON arguments
///
/// Only calls that will reach the site take a rate-limit slot: malformed
/// arguments and invalid ids are rejected first.
pub async fn call_tool(
    server: &McpServer,
    tool: Tool,
    arguments: Value,
) -> std::result::Result<ToolOutcome, JsonRpcError> {
    let call = ToolCall::parse(tool, arguments)?;

    let result = match call.validate() {
        Ok(()) => {
            server.rate_limiter().check(tool.name())?;
            call.run(server).await
        }
        Err(e) => Err(e),
    };

    Ok(match result {
        Ok(text) => ToolOutcome {
            text,
            is_error: false,
        },
        Err(e) => {
            tracing::error!(tool = tool.name(), error = %e, "Tool failed");
            ToolOutcome {
                text: format!("{}{}", ERROR_PREFIX, e),
                is_error: true,
            }
        }
    })
}

/// Deserialize arguments; `null` means `{}` when every field is optional
fn parse_args<T: DeserializeOwned>(
    arguments: Value,
    all_optional: bool,
) -> std::result::Result<T, JsonRpcError> {
    let arguments = match arguments {
        Value::Null if all_optional => json!({}),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {}", e)))
}

pub async fn get_top_page(server: &McpServer, args: TopPageArgs) -> Result<String> {
    let limit = args.limit.unwrap_or(server.config().default_limit);
    server.client().top_page(limit).await
}

pub async fn search_works(server: &McpServer, args: SearchWorksArgs) -> Result<String> {
    let query = SearchQuery {
        q: args.q,
        page: args.page.unwrap_or(1),
        ex_q: args.ex_q,
        serial_status: args.serial_status,
        genre_name: args.genre_name,
        total_review_point_range: args.total_review_point_range,
        total_character_count_range: args.total_character_count_range,
        published_date_range: args.published_date_range,
        last_episode_published_date_range: args.last_episode_published_date_range,
        limit: args.limit.unwrap_or(server.config().default_limit),
    };
    server.client().search_works(&query).await
}

pub async fn get_work_episodes(server: &McpServer, args: WorkEpisodesArgs) -> Result<String> {
    let limit = args.limit.unwrap_or(server.config().episode_limit);
    server.client().work_episodes(&args.work_id, limit).await
}

pub async fn get_episode_content(server: &McpServer, args: EpisodeContentArgs) -> Result<String> {
    server
        .client()
        .episode_content(&args.work_id, &args.episode_id)
        .await
}

pub async fn get_rankings(server: &McpServer, args: RankingsArgs) -> Result<String> {
    let defaults = RankingQuery::default();
    let query = RankingQuery {
        genre: args.genre.unwrap_or(defaults.genre),
        period: args.period.unwrap_or(defaults.period),
        limit: args.limit.unwrap_or(server.config().default_limit),
    };
    server.client().rankings(&query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_roundtrips_every_tool() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("get_bookshelf"), None);
    }

    #[test]
    fn test_definitions_have_schemas() {
        let defs = tool_definitions();
        assert_eq!(defs.len(), 5);

        let search = defs.iter().find(|d| d["name"] == "search_works").unwrap();
        let schema = &search["inputSchema"];
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["q"].is_object());
        assert_eq!(schema["required"], json!(["q"]));

        let episode = defs.iter().find(|d| d["name"] == "get_episode_content").unwrap();
        let required = episode["inputSchema"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
    }

    #[test]
    fn test_parse_args_null_for_optional_only() {
        let args: TopPageArgs = parse_args(Value::Null, true).unwrap();
        assert_eq!(args.limit, None);

        let err = parse_args::<WorkEpisodesArgs>(Value::Null, false).unwrap_err();
        assert_eq!(err.code, crate::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_args_wrong_type() {
        let err = parse_args::<TopPageArgs>(json!({"limit": "ten"}), true).unwrap_err();
        assert!(err.message.contains("Invalid arguments"));
    }

    #[test]
    fn test_validate_rejects_path_segments() {
        let call = ToolCall::parse(Tool::GetWorkEpisodes, json!({"work_id": "../x"})).unwrap();
        assert!(call.validate().is_err());

        let call = ToolCall::parse(Tool::GetRankings, json!({"period": "weekly"})).unwrap();
        assert!(call.validate().is_ok());

        let call = ToolCall::parse(Tool::GetRankings, json!({"genre": "a/b"})).unwrap();
        assert!(call.validate().is_err());
    }

    #[test]
    fn test_outcome_value() {
        let value = ToolOutcome {
            text: "ok".to_string(),
            is_error: false,
        }
        .into_value();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["isError"], false);
    }
}
