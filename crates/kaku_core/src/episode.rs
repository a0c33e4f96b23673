//! Episode body extraction

use crate::html::{has_class, selector, stripped_text};
use kaku_common::Result;
use scraper::Html;

/// Paragraph texts of the episode body, `None` when the page has no body
///
/// `<p class="blank">` spacer paragraphs are dropped.
pub fn extract_body(html: &str) -> Result<Option<Vec<String>>> {
    let document = Html::parse_document(html);
    let body_sel = selector("div.widget-episodeBody.js-episode-body")?;
    let p_sel = selector("p")?;

    let Some(body) = document.select(&body_sel).next() else {
        return Ok(None);
    };

    let paragraphs = body
        .select(&p_sel)
        .filter(|p| !has_class(*p, "blank"))
        .map(stripped_text)
        .collect();

    Ok(Some(paragraphs))
}
