//! HTML fixtures shaped like Kakuyomu pages

use serde_json::{json, Value};

/// A Next.js page whose `__NEXT_DATA__` carries `apollo_state`
///
/// # Example
/// ```rust
/// use kaku_test_helpers::fixtures::next_data_page;
/// use serde_json::json;
///
/// let html = next_data_page(&json!({"Work:1": {"id": "1"}}));
/// assert!(html.contains("__NEXT_DATA__"));
/// ```
pub fn next_data_page(apollo_state: &Value) -> String {
    let next_data = json!({
        "props": {
            "pageProps": {
                "__APOLLO_STATE__": apollo_state
            },
            "__N_SSP": true
        },
        "page": "/",
        "query": {},
        "buildId": "test-build"
    });

    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"ja\"><head><title>カクヨム</title></head>",
            "<body><div id=\"__next\"></div>",
            "<script id=\"__NEXT_DATA__\" type=\"application/json\">{}</script>",
            "</body></html>"
        ),
        next_data
    )
}

/// An episode viewer page with the given paragraphs
///
/// `None` entries become `<p class="blank"><br /></p>` spacers.
pub fn episode_page(paragraphs: &[Option<&str>]) -> String {
    let body: String = paragraphs
        .iter()
        .enumerate()
        .map(|(i, p)| match p {
            Some(text) => format!("<p id=\"p{}\">{}</p>", i + 1, text),
            None => format!("<p id=\"p{}\" class=\"blank\"><br /></p>", i + 1),
        })
        .collect();

    format!(
        concat!(
            "<!DOCTYPE html><html><body>",
            "<header><p>ヘッダー</p></header>",
            "<div class=\"widget-episodeBody js-episode-body\">{}</div>",
            "<footer><p>フッター</p></footer>",
            "</body></html>"
        ),
        body
    )
}

/// One ranking card
pub fn ranking_card(rank: u32, work_id: &str, title: &str, author: &str, tags: &[&str]) -> String {
    let tag_items: String = tags
        .iter()
        .map(|t| format!("<li><a href=\"/tags/{0}\"><span itemprop=\"keywords\">{0}</span></a></li>", t))
        .collect();

    format!(
        concat!(
            "<div class=\"widget-work float-parent\">",
            "<p class=\"widget-work-rank\">{rank}</p>",
            "<h3><a href=\"/works/{id}\" class=\"widget-workCard-titleLabel\">{title}</a></h3>",
            "<a href=\"/users/u{rank}\" class=\"widget-workCard-authorLabel\">{author}</a>",
            "<a href=\"/works/{id}/reviews\" itemprop=\"reviewBody\">{title}のレビュー</a>",
            "<ul class=\"widget-workCard-tags\">{tags}</ul>",
            "<p class=\"widget-workCard-introduction\"><a href=\"/works/{id}\">{title}のあらすじ</a></p>",
            "</div>"
        ),
        rank = rank,
        id = work_id,
        title = title,
        author = author,
        tags = tag_items
    )
}

/// A ranking page wrapping the given cards
pub fn ranking_page(cards: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><body><div class=\"widget-media-genresWorkList\">{}</div></body></html>",
        cards.concat()
    )
}
