//! Small helpers over `scraper`

use kaku_common::{KakuError, Result};
use scraper::{ElementRef, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| KakuError::ParseError(format!("invalid selector {:?}: {:?}", css, e)))
}

/// Text of an element with every text node trimmed and empty ones dropped
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_stripped_text_joins_without_separator() {
        let doc = Html::parse_fragment("<p>  foo <ruby>漢<rt> かん </rt></ruby>\n bar </p>");
        let p = doc.select(&selector("p").unwrap()).next().unwrap();
        assert_eq!(stripped_text(p), "foo漢かんbar");
    }

    #[test]
    fn test_stripped_text_drops_ideographic_space() {
        let doc = Html::parse_fragment("<p>\u{3000}本文</p>");
        let p = doc.select(&selector("p").unwrap()).next().unwrap();
        assert_eq!(stripped_text(p), "本文");
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(selector("p[").unwrap_err(), KakuError::ParseError(_)));
    }
}
