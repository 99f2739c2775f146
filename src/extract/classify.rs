use scraper::{Html, Selector};

use super::rules::ContentTypeRule;
use crate::core::models::ContentType;
use crate::errors::SummarizerError;

/// Pick the first rule whose URL, title or selector hints match the page.
pub fn detect_content_type(
    rules: &[ContentTypeRule],
    document: &Html,
    url: &str,
    title: &str,
) -> Result<ContentType, SummarizerError> {
    let url = url.to_lowercase();
    let title = title.to_lowercase();

    for rule in rules {
        if rule.url_keywords.iter().any(|k| url.contains(&k.to_lowercase()))
            || rule
                .title_keywords
                .iter()
                .any(|k| title.contains(&k.to_lowercase()))
        {
            return Ok(rule.content_type);
        }

        for raw in &rule.selectors {
            let selector = Selector::parse(raw).map_err(|e| {
                SummarizerError::ExtractionFailure(format!("invalid selector {raw:?}: {e}"))
            })?;
            if document.select(&selector).next().is_some() {
                return Ok(rule.content_type);
            }
        }
    }

    Ok(ContentType::General)
}
