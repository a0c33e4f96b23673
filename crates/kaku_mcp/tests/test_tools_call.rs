//! tools/call against a mock site

use kaku_config::Config;
use kaku_mcp::{JsonRpcRequest, McpServer, INVALID_PARAMS, RATE_LIMITED};
use kaku_test_helpers::prelude::*;
use serde_json::{json, Value};

fn server_for(site: &MockSite) -> McpServer {
    let mut config = Config::default();
    config.http.base_url = site.url();
    McpServer::new(&config).unwrap()
}

async fn call_tool(server: &McpServer, name: &str, args: Value) -> Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(1)),
        method: "tools/call".to_string(),
        params: Some(json!({
            "name": name,
            "arguments": args
        })),
    };

    let resp = server.handle_request(req).await.expect("Request failed");
    assert!(resp.error.is_none(), "Tool call returned error: {:?}", resp.error);
    resp.result.unwrap()
}

#[tokio::test]
async fn test_get_top_page_default_limit() {
    suppress_logs();
    let site = MockSite::start().await;
    let works: serde_json::Map<String, Value> = (1..=12)
        .map(|i| (format!("Work:{}", i), json!({"id": i.to_string(), "title": format!("作品{}", i)})))
        .collect();
    site.page("/", next_data_page(&Value::Object(works))).await;

    let server = server_for(&site);
    let result = call_tool(&server, "get_top_page", json!({})).await;

    assert!(!tool_is_error(&result));
    let text = tool_text(&result);
    assert_eq!(text.matches("ID: ").count(), 10);
    assert!(text.starts_with("ID: 1\nタイトル: 作品1\n"));
    assert!(!text.contains("作品11"));
}

#[tokio::test]
async fn test_search_works() {
    let site = MockSite::start().await;
    site.page_with_query(
        "/search",
        &[("q", "猫"), ("page", "1"), ("serial_status", "completed")],
        next_data_page(&json!({
            "Work:5": {
                "id": "5",
                "title": "猫の国",
                "catchphrase": "にゃー",
                "tagLabels": ["猫", "日常"],
                "introduction": "猫が暮らす国の話。"
            }
        })),
    )
    .await;

    let server = server_for(&site);
    let result = call_tool(
        &server,
        "search_works",
        json!({"q": "猫", "serial_status": "completed", "genre_name": ""}),
    )
    .await;

    assert_eq!(
        tool_text(&result),
        "ID: 5\nタイトル: 猫の国\nキャッチフレーズ: にゃー\nタグ: 猫, 日常\nイントロダクション:\n```\n猫が暮らす国の話。\n```\n"
    );
}

#[tokio::test]
async fn test_get_work_episodes_and_content() {
    let site = MockSite::start().await;
    site.page(
        "/works/77",
        next_data_page(&json!({
            "Episode:1": {"id": "1", "title": "プロローグ", "publishedAt": "2022-02-22T12:00:00Z"}
        })),
    )
    .await;
    site.page("/works/77/episodes/1", episode_page(&[Some("はじまり"), None, Some("おわり")]))
        .await;

    let server = server_for(&site);

    let episodes = call_tool(&server, "get_work_episodes", json!({"work_id": "77"})).await;
    assert_eq!(
        tool_text(&episodes),
        "ID: 1\nタイトル: プロローグ\n公開日: 2022-02-22T12:00:00Z\n"
    );

    let content = call_tool(
        &server,
        "get_episode_content",
        json!({"work_id": "77", "episode_id": "1"}),
    )
    .await;
    assert_eq!(tool_text(&content), "はじまり\nおわり");
}

#[tokio::test]
async fn test_get_rankings_defaults() {
    let site = MockSite::start().await;
    site.page(
        "/rankings/all/daily",
        ranking_page(&[ranking_card(1, "9", "日刊一位", "著者", &["現代ドラマ"])]),
    )
    .await;

    let server = server_for(&site);
    let result = call_tool(&server, "get_rankings", Value::Null).await;

    let text = tool_text(&result);
    assert!(text.starts_with("順位: 1\nID: 9\nタイトル: 日刊一位\n作者: 著者\n"));
    assert!(text.contains("タグ: 現代ドラマ\n"));
}

#[tokio::test]
async fn test_site_failure_is_tool_error() {
    let site = MockSite::start().await;
    site.status("/works/500", 503).await;

    let server = server_for(&site);
    let result = call_tool(&server, "get_work_episodes", json!({"work_id": "500"})).await;

    assert!(tool_is_error(&result));
    assert!(tool_text(&result).starts_with("エラーが発生しました: HTTP 503"));
}

#[tokio::test]
async fn test_invalid_id_is_tool_error_without_request() {
    let site = MockSite::start().await;
    let server = server_for(&site);

    let result = call_tool(
        &server,
        "get_episode_content",
        json!({"work_id": "1", "episode_id": "../../admin"}),
    )
    .await;

    assert!(tool_is_error(&result));
    assert!(tool_text(&result).contains("episode_id"));
    assert_eq!(site.request_count().await, 0);
}

#[tokio::test]
async fn test_missing_required_argument_is_protocol_error() {
    let site = MockSite::start().await;
    let server = server_for(&site);

    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(3)),
        method: "tools/call".to_string(),
        params: Some(json!({"name": "search_works", "arguments": {"page": 2}})),
    };
    let resp = server.handle_request(req).await.unwrap();
    assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
}

#[tokio::test]
async fn test_unknown_tool() {
    let site = MockSite::start().await;
    let server = server_for(&site);

    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(4)),
        method: "tools/call".to_string(),
        params: Some(json!({"name": "post_review", "arguments": {}})),
    };
    let resp = server.handle_request(req).await.unwrap();
    let error = resp.error.unwrap();
    assert_eq!(error.code, INVALID_PARAMS);
    assert!(error.message.contains("post_review"));
}

#[tokio::test]
async fn test_rate_limit_per_tool() {
    let site = MockSite::start().await;
    site.page("/", next_data_page(&json!({}))).await;

    let mut config = Config::default();
    config.http.base_url = site.url();
    config.mcp.rate_limit_per_minute = 2;
    let server = McpServer::new(&config).unwrap();

    for _ in 0..2 {
        call_tool(&server, "get_top_page", json!({})).await;
    }

    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(9)),
        method: "tools/call".to_string(),
        params: Some(json!({"name": "get_top_page"})),
    };
    let resp = server.handle_request(req).await.unwrap();
    let error = resp.error.unwrap();
    assert_eq!(error.code, RATE_LIMITED);
    let data = error.data.unwrap();
    assert_eq!(data["window_seconds"], 60);
    assert!(data["retry_after_seconds"].as_u64().unwrap() <= 60);
    assert_eq!(site.request_count().await, 2);
}

#[tokio::test]
async fn test_rejected_calls_do_not_use_rate_limit() {
    let site = MockSite::start().await;
    site.page(
        "/works/1",
        next_data_page(&json!({"Episode:1": {"id": "1", "title": "第一話"}})),
    )
    .await;

    let mut config = Config::default();
    config.http.base_url = site.url();
    config.mcp.rate_limit_per_minute = 2;
    let server = McpServer::new(&config).unwrap();

    for _ in 0..2 {
        let result = call_tool(&server, "get_work_episodes", json!({"work_id": "../x"})).await;
        assert!(tool_is_error(&result));
    }

    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(10)),
        method: "tools/call".to_string(),
        params: Some(json!({"name": "get_work_episodes", "arguments": {"limit": "many"}})),
    };
    let resp = server.handle_request(req).await.unwrap();
    assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);

    let result = call_tool(&server, "get_work_episodes", json!({"work_id": "1"})).await;
    assert!(!tool_is_error(&result));
    assert_eq!(tool_text(&result), "ID: 1\nタイトル: 第一話\n");
    assert_eq!(site.request_count().await, 1);
}
