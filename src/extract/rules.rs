//! Selector lists and thresholds driving content extraction.

use crate::core::models::ContentType;

pub const DEFAULT_TITLE: &str = "Untitled Page";
pub const MIN_CONTAINER_TEXT_LEN: usize = 200;
pub const MIN_BLOCK_TEXT_LEN: usize = 20;
pub const MIN_CONTENT_LEN: usize = 100;
pub const MIN_SUMMARIZABLE_WORDS: usize = 50;

/// Hints that mark a page as a particular kind of content.
///
/// A rule fires when any URL keyword, title keyword or selector matches.
/// Keywords are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeRule {
    pub content_type: ContentType,
    pub url_keywords: Vec<String>,
    pub title_keywords: Vec<String>,
    pub selectors: Vec<String>,
}

impl ContentTypeRule {
    fn new(content_type: ContentType, url: &[&str], title: &[&str], selectors: &[&str]) -> Self {
        Self {
            content_type,
            url_keywords: owned(url),
            title_keywords: owned(title),
            selectors: owned(selectors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorRules {
    /// Tried in order; the first non-empty match is the title.
    pub title_selectors: Vec<String>,
    /// Candidate main-content containers, most specific first.
    pub container_selectors: Vec<String>,
    /// Subtrees dropped before any text is collected.
    pub exclude_selectors: Vec<String>,
    pub heading_selector: String,
    pub block_selector: String,
    /// Evaluated in order; first match wins, otherwise general.
    pub content_type_rules: Vec<ContentTypeRule>,
    pub default_title: String,
    pub min_container_text_len: usize,
    pub min_block_text_len: usize,
    pub min_content_len: usize,
    pub min_summarizable_words: usize,
}

impl Default for ExtractorRules {
    fn default() -> Self {
        Self {
            title_selectors: owned(&[
                "h1",
                ".title",
                ".post-title",
                ".article-title",
                ".entry-title",
                "title",
            ]),
            container_selectors: owned(&[
                "article",
                "[role=\"main\"]",
                "main",
                ".content",
                ".post-content",
                ".entry-content",
                ".article-content",
                ".story-body",
                ".post-body",
                ".container",
                "#content",
                "#main",
            ]),
            exclude_selectors: owned(&[
                "nav",
                "header",
                "footer",
                "aside",
                ".sidebar",
                ".navigation",
                ".menu",
                ".ads",
                ".advertisement",
                ".social-share",
                ".comments",
                ".related-posts",
                "script",
                "style",
                "noscript",
            ]),
            heading_selector: "h1, h2, h3, h4, h5, h6".to_string(),
            block_selector: "p, div, section, li".to_string(),
            content_type_rules: vec![
                ContentTypeRule::new(
                    ContentType::Documentation,
                    &["docs", "documentation"],
                    &["documentation", "docs"],
                    &[],
                ),
                ContentTypeRule::new(
                    ContentType::Blog,
                    &["blog", "post"],
                    &["blog"],
                    &[".blog", ".post"],
                ),
                ContentTypeRule::new(ContentType::Article, &["article"], &[], &["article", ".article"]),
            ],
            default_title: DEFAULT_TITLE.to_string(),
            min_container_text_len: MIN_CONTAINER_TEXT_LEN,
            min_block_text_len: MIN_BLOCK_TEXT_LEN,
            min_content_len: MIN_CONTENT_LEN,
            min_summarizable_words: MIN_SUMMARIZABLE_WORDS,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
