//! MCP resources

use crate::JsonRpcError;
use serde::Deserialize;
use serde_json::{json, Value};

/// URI of the server information resource
pub const SERVER_INFO_URI: &str = "info://kakuyomu-server";

/// Server information text
pub const SERVER_INFO: &str = "カクヨム MCP サーバー

小説投稿サイト「カクヨム」のコンテンツを読み込むためのMCPサーバーです。

利用可能なツール:
1. get_top_page - トップページから最新作品一覧を取得
2. search_works - 作品を検索
3. get_work_episodes - 作品のエピソード一覧を取得
4. get_episode_content - エピソードの本文を取得
5. get_rankings - ランキングページから作品ランキングを取得
";

/// `resources/list` entries
pub fn resource_list() -> Vec<Value> {
    vec![json!({
        "uri": SERVER_INFO_URI,
        "name": "get_server_info",
        "description": "カクヨムMCPサーバーについての情報",
        "mimeType": "text/plain"
    })]
}

/// `resources/read`
pub fn read_resource(params: Option<Value>) -> Result<Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct ReadParams {
        uri: String,
    }

    let params: ReadParams = params
        .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
        .and_then(|v| {
            serde_json::from_value(v)
                .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
        })?;

    if params.uri != SERVER_INFO_URI {
        return Err(JsonRpcError::invalid_params(format!(
            "Unknown resource: {}",
            params.uri
        )));
    }

    Ok(json!({
        "contents": [{
            "uri": SERVER_INFO_URI,
            "mimeType": "text/plain",
            "text": SERVER_INFO
        }]
    }))
}
