//! Plain-text rendering for LLM consumption
//!
//! One labelled line per present field, a blank line after each record.
//! Missing, null, empty-string and empty-array fields produce no line.

use crate::apollo::ApolloState;
use crate::model::RankingEntry;
use serde_json::Value;

/// Render works for the given Apollo keys
pub fn works_to_string(state: &ApolloState, keys: &[&str]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for key in keys {
        if let Some(work) = state.get(*key) {
            push_field(&mut lines, "ID", scalar(work, "id"));
            push_field(&mut lines, "タイトル", scalar(work, "title"));
            push_field(&mut lines, "キャッチフレーズ", scalar(work, "catchphrase"));
            push_tags(&mut lines, &list(work, "tagLabels"));
            push_introduction(&mut lines, scalar(work, "introduction"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render episodes for the given Apollo keys
pub fn episodes_to_string(state: &ApolloState, keys: &[&str]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for key in keys {
        if let Some(episode) = state.get(*key) {
            push_field(&mut lines, "ID", scalar(episode, "id"));
            push_field(&mut lines, "タイトル", scalar(episode, "title"));
            push_field(&mut lines, "公開日", scalar(episode, "publishedAt"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render scraped ranking cards
pub fn rankings_to_string(rankings: &[RankingEntry]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for entry in rankings {
        push_field(&mut lines, "順位", non_empty(&entry.rank));
        push_field(&mut lines, "ID", non_empty(&entry.id));
        push_field(&mut lines, "タイトル", non_empty(&entry.title));
        push_field(&mut lines, "作者", non_empty(&entry.author));
        push_field(&mut lines, "キャッチフレーズ", non_empty(&entry.catchphrase));
        push_tags(&mut lines, &entry.tags);
        push_introduction(&mut lines, non_empty(&entry.introduction));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn push_field(lines: &mut Vec<String>, label: &str, value: Option<String>) {
    if let Some(v) = value {
        lines.push(format!("{}: {}", label, v));
    }
}

fn push_tags(lines: &mut Vec<String>, tags: &[String]) {
    if !tags.is_empty() {
        lines.push(format!("タグ: {}", tags.join(", ")));
    }
}

fn push_introduction(lines: &mut Vec<String>, introduction: Option<String>) {
    if let Some(intro) = introduction {
        lines.push(format!("イントロダクション:\n```\n{}\n```", intro));
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// A present scalar field rendered as text
fn scalar(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// A present array field rendered as a list of strings
fn list(entry: &Value, key: &str) -> Vec<String> {
    match entry.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
