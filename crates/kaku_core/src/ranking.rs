//! Ranking page scraping
//!
//! Ranking pages are not backed by the Apollo cache, so cards are read
//! straight from the rendered markup.

use crate::html::{selector, stripped_text};
use crate::model::RankingEntry;
use kaku_common::Result;
use scraper::Html;

/// Parse up to `limit` ranking cards in page order
pub fn parse_rankings(html: &str, limit: usize) -> Result<Vec<RankingEntry>> {
    let document = Html::parse_document(html);

    let card_sel = selector("div.widget-work.float-parent")?;
    let rank_sel = selector("p.widget-work-rank")?;
    let title_sel = selector("a.widget-workCard-titleLabel")?;
    let author_sel = selector("a.widget-workCard-authorLabel")?;
    let review_sel = selector(r#"a[itemprop="reviewBody"]"#)?;
    let tag_sel = selector(r#"a[href*="/tags/"]"#)?;
    let span_sel = selector("span")?;
    let intro_sel = selector("p.widget-workCard-introduction")?;
    let link_sel = selector("a")?;

    let mut rankings = Vec::new();

    for card in document.select(&card_sel).take(limit) {
        let mut entry = RankingEntry::default();

        if let Some(rank) = card.select(&rank_sel).next() {
            entry.rank = Some(stripped_text(rank));
        }

        if let Some(title_link) = card.select(&title_sel).next() {
            entry.id = title_link
                .value()
                .attr("href")
                .and_then(work_id_from_href);
            entry.title = Some(stripped_text(title_link));
        }

        if let Some(author) = card.select(&author_sel).next() {
            entry.author = Some(stripped_text(author));
        }

        if let Some(review) = card.select(&review_sel).next() {
            entry.catchphrase = Some(stripped_text(review));
        }

        entry.tags = card
            .select(&tag_sel)
            .filter_map(|tag| tag.select(&span_sel).next())
            .map(stripped_text)
            .collect();

        if let Some(link) = card
            .select(&intro_sel)
            .next()
            .and_then(|intro| intro.select(&link_sel).next())
        {
            entry.introduction = Some(stripped_text(link));
        }

        rankings.push(entry);
    }

    tracing::debug!(count = rankings.len(), "Parsed ranking cards");
    Ok(rankings)
}

/// `/works/1177354054880238351` → `1177354054880238351`
fn work_id_from_href(href: &str) -> Option<String> {
    if !href.contains("/works/") {
        return None;
    }
    href.rsplit("/works/")
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
