//! Page content extraction
//!
//! Picks the most likely main-content container of a parsed page, strips
//! navigation/ads/scripts and returns normalised plain text together with a
//! title, a word count and a coarse content category.

pub mod classify;
pub mod rules;

use regex::Regex;
use std::ops::Range;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::core::models::ExtractedContent;
use crate::errors::SummarizerError;
pub use rules::{ContentTypeRule, ExtractorRules};

static WHITESPACE_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

static EXCESS_NEWLINES_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\n{3,}").unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// Collapse whitespace runs to one space, then blank-line runs to one blank
/// line, then trim.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(raw, " ");
    EXCESS_NEWLINES_RE
        .replace_all(&collapsed, "\n\n")
        .trim()
        .to_string()
}

#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Only regular web pages are candidates for summarisation.
#[must_use]
pub fn is_supported_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

struct CompiledRules {
    titles: Vec<Selector>,
    containers: Vec<Selector>,
    excluded: Vec<Selector>,
    heading: Selector,
    block: Selector,
    body: Selector,
    document_title: Selector,
}

fn compile(raw: &str) -> Result<Selector, SummarizerError> {
    Selector::parse(raw)
        .map_err(|e| SummarizerError::ExtractionFailure(format!("invalid selector {raw:?}: {e}")))
}

fn compile_all(raw: &[String]) -> Result<Vec<Selector>, SummarizerError> {
    raw.iter().map(|s| compile(s)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    rules: ExtractorRules,
}

impl ContentExtractor {
    #[must_use]
    pub fn new(rules: ExtractorRules) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &ExtractorRules {
        &self.rules
    }

    /// Best-effort extraction. Never fails: anything that goes wrong is
    /// logged and reported as "not summarizable".
    #[must_use]
    pub fn extract(&self, html: &str, url: &str) -> Option<ExtractedContent> {
        match self.try_extract(html, url) {
            Ok(extracted) => Some(extracted),
            Err(e) => {
                debug!("Page not extractable: {}", e);
                None
            }
        }
    }

    #[must_use]
    pub fn is_summarizable(&self, html: &str, url: &str) -> bool {
        self.extract(html, url)
            .is_some_and(|e| e.word_count >= self.rules.min_summarizable_words)
    }

    /// # Errors
    ///
    /// Returns `ExtractionFailure` when a configured selector is invalid or
    /// the page does not hold enough text.
    pub fn try_extract(&self, html: &str, url: &str) -> Result<ExtractedContent, SummarizerError> {
        let compiled = self.compile_rules().inspect_err(|e| {
            warn!("Extractor rules rejected: {}", e);
        })?;
        let document = Html::parse_document(html);

        let title = self.extract_title(&document, &compiled.titles);
        let container = self.find_container(&document, &compiled);
        let content = normalize_text(&self.assemble_text(container, &compiled));

        let length = content.chars().count();
        if length < self.rules.min_content_len {
            return Err(SummarizerError::ExtractionFailure(format!(
                "content too short ({length} characters)"
            )));
        }

        let page_title = document
            .select(&compiled.document_title)
            .next()
            .map(|el| collapse_inline(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title.clone());
        let content_type = classify::detect_content_type(
            &self.rules.content_type_rules,
            &document,
            url,
            &page_title,
        )?;

        Ok(ExtractedContent {
            word_count: word_count(&content),
            title,
            content,
            url: url.to_string(),
            content_type,
        })
    }

    fn compile_rules(&self) -> Result<CompiledRules, SummarizerError> {
        Ok(CompiledRules {
            titles: compile_all(&self.rules.title_selectors)?,
            containers: compile_all(&self.rules.container_selectors)?,
            excluded: compile_all(&self.rules.exclude_selectors)?,
            heading: compile(&self.rules.heading_selector)?,
            block: compile(&self.rules.block_selector)?,
            body: compile("body")?,
            document_title: compile("title")?,
        })
    }

    fn extract_title(&self, document: &Html, selectors: &[Selector]) -> String {
        selectors
            .iter()
            .filter_map(|sel| document.select(sel).next())
            .map(|el| collapse_inline(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| self.rules.default_title.clone())
    }

    fn find_container<'a>(&self, document: &'a Html, compiled: &CompiledRules) -> ElementRef<'a> {
        for selector in &compiled.containers {
            for element in document.select(selector) {
                let length = element.text().map(|t| t.chars().count()).sum::<usize>();
                if length > self.rules.min_container_text_len {
                    return element;
                }
            }
        }

        document
            .select(&compiled.body)
            .next()
            .unwrap_or_else(|| document.root_element())
    }

    fn assemble_text(&self, container: ElementRef<'_>, compiled: &CompiledRules) -> String {
        let walk = walk_visible(container, compiled);

        let headings: Vec<&str> = walk
            .headings
            .iter()
            .map(|span| walk.text[span.clone()].trim())
            .filter(|text| !text.is_empty())
            .collect();
        let blocks: Vec<&str> = walk
            .blocks
            .iter()
            .map(|span| walk.text[span.clone()].trim())
            .filter(|text| text.chars().count() > self.rules.min_block_text_len)
            .collect();

        if headings.is_empty() && blocks.is_empty() {
            return walk.text.trim().to_string();
        }

        headings
            .into_iter()
            .map(|h| format!("\n{h}\n"))
            .chain(blocks.into_iter().map(str::to_string))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn collapse_inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of a container plus the byte spans of its headings and
/// blocks, in document order.
struct VisibleText {
    text: String,
    headings: Vec<Range<usize>>,
    blocks: Vec<Range<usize>>,
}

enum Step<'a> {
    Open(ElementRef<'a>),
    Text(&'a str),
    Close {
        heading: Option<usize>,
        block: Option<usize>,
    },
}

/// Single iterative pass over the container. Excluded subtrees are never
/// entered, and an element's text is the contiguous slice of `text`
/// written between its open and close steps.
fn walk_visible(container: ElementRef<'_>, compiled: &CompiledRules) -> VisibleText {
    let mut out = VisibleText {
        text: String::new(),
        headings: Vec::new(),
        blocks: Vec::new(),
    };
    let mut stack = Vec::new();
    push_children(container, &mut stack);

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => out.text.push_str(text),
            Step::Open(element) => {
                if compiled.excluded.iter().any(|sel| sel.matches(&element)) {
                    continue;
                }
                let at = out.text.len();
                let heading = compiled.heading.matches(&element).then(|| {
                    out.headings.push(at..at);
                    out.headings.len() - 1
                });
                let block = compiled.block.matches(&element).then(|| {
                    out.blocks.push(at..at);
                    out.blocks.len() - 1
                });
                stack.push(Step::Close { heading, block });
                push_children(element, &mut stack);
            }
            Step::Close { heading, block } => {
                let end = out.text.len();
                if let Some(i) = heading {
                    out.headings[i].end = end;
                }
                if let Some(i) = block {
                    out.blocks[i].end = end;
                }
            }
        }
    }

    out
}

/// Queue children so they pop in document order.
fn push_children<'a>(element: ElementRef<'a>, stack: &mut Vec<Step<'a>>) {
    let children: Vec<Step<'a>> = element
        .children()
        .filter_map(|child| {
            if let Some(text) = child.value().as_text() {
                Some(Step::Text(text))
            } else {
                ElementRef::wrap(child).map(Step::Open)
            }
        })
        .collect();
    stack.extend(children.into_iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ContentType;

    const LOREM: &str = "The quick brown fox jumps over the lazy dog near the river bank today.";

    fn paragraphs(n: usize) -> String {
        (0..n).map(|_| format!("<p>{LOREM}</p>")).collect()
    }

    #[test]
    fn test_normalize_text_collapses_all_whitespace() {
        let raw = "  Heading \n\n\n\n  first   para\t\tline \n\n\nsecond  ";
        assert_eq!(normalize_text(raw), "Heading first para line second");
        assert_eq!(
            normalize_text("Heading\n\nFirst paragraph text\n\nSecond"),
            "Heading First paragraph text Second"
        );
    }

    #[test]
    fn test_word_count_splits_on_whitespace() {
        assert_eq!(word_count("one two\n\nthree\tfour"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_supported_urls() {
        assert!(is_supported_url("https://example.com/a"));
        assert!(is_supported_url("http://example.com"));
        assert!(!is_supported_url("chrome://extensions"));
        assert!(!is_supported_url("not a url"));
    }

    #[test]
    fn test_title_prefers_heading_over_document_title() {
        let html = format!(
            "<html><head><title>Doc Title</title></head><body><h1>  Main\n Heading </h1>{}</body></html>",
            paragraphs(5)
        );
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert_eq!(extracted.title, "Main Heading");
    }

    #[test]
    fn test_title_falls_back_to_default() {
        let html = format!("<html><body><div>{}</div></body></html>", paragraphs(5));
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert_eq!(extracted.title, "Untitled Page");
    }

    #[test]
    fn test_excluded_subtrees_are_dropped() {
        let html = format!(
            "<html><body><main><nav><p>Home About Contact Careers Press Investors</p></nav>\
             {}<script>var tracking = 'should never appear in output';</script>\
             <div class=\"comments\"><p>First comment that is long enough to count</p></div></main></body></html>",
            paragraphs(4)
        );
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert!(extracted.content.contains("quick brown fox"));
        assert!(!extracted.content.contains("Careers"));
        assert!(!extracted.content.contains("tracking"));
        assert!(!extracted.content.contains("First comment"));
    }

    #[test]
    fn test_headings_come_before_paragraphs() {
        let html = format!(
            "<html><body><article>{}<h2>Closing Section</h2>{}</article></body></html>",
            paragraphs(2),
            paragraphs(2)
        );
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert!(extracted.content.starts_with("Closing Section The quick brown fox"));
    }

    #[test]
    fn test_deeply_nested_markup_is_walked_without_recursion() {
        let depth = 5_000;
        let html = format!(
            "<html><body>{}<nav><p>Home About Contact Careers</p></nav>{}{}</body></html>",
            "<div>".repeat(depth),
            paragraphs(4),
            "</div>".repeat(depth)
        );
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert!(extracted.content.starts_with("The quick brown fox"));
        assert!(!extracted.content.contains("Careers"));
    }

    #[test]
    fn test_short_blocks_are_skipped() {
        let html = format!(
            "<html><body><article><p>Share this</p>{}</article></body></html>",
            paragraphs(3)
        );
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert!(!extracted.content.contains("Share this"));
    }

    #[test]
    fn test_small_container_is_skipped_for_body() {
        // The <article> holds under 200 characters so the body is used instead.
        let html = format!(
            "<html><body><article><p>{LOREM}</p></article><section>{}</section></body></html>",
            paragraphs(3)
        );
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert!(extracted.word_count > 14 * 3);
    }

    #[test]
    fn test_raw_text_fallback_without_structure() {
        let body = LOREM.repeat(3);
        let html = format!("<html><body><span>{body}</span></body></html>");
        let extracted = ContentExtractor::default()
            .extract(&html, "https://example.com/page")
            .unwrap();
        assert_eq!(extracted.word_count, 14 * 3 - 2);
    }

    #[test]
    fn test_too_short_page_is_rejected() {
        let html = "<html><body><p>Just a little bit of text here.</p></body></html>";
        let extractor = ContentExtractor::default();
        assert!(extractor.extract(html, "https://example.com").is_none());
        assert!(!extractor.is_summarizable(html, "https://example.com"));
    }

    #[test]
    fn test_invalid_selector_yields_none() {
        let rules = ExtractorRules {
            container_selectors: vec!["[[broken".to_string()],
            ..ExtractorRules::default()
        };
        let html = format!("<html><body>{}</body></html>", paragraphs(10));
        assert!(ContentExtractor::new(rules).extract(&html, "https://example.com").is_none());
    }

    #[test]
    fn test_summarizable_requires_fifty_words() {
        let extractor = ContentExtractor::default();
        // 14 words per paragraph: 3 paragraphs = 42 words, 4 = 56 words.
        let short = format!("<html><body><article>{}</article></body></html>", paragraphs(3));
        let long = format!("<html><body><article>{}</article></body></html>", paragraphs(4));
        assert!(extractor.extract(&short, "https://example.com").is_some());
        assert!(!extractor.is_summarizable(&short, "https://example.com"));
        assert!(extractor.is_summarizable(&long, "https://example.com"));
    }

    #[test]
    fn test_content_type_uses_url_hint() {
        let html = format!("<html><body><main>{}</main></body></html>", paragraphs(4));
        let extracted = ContentExtractor::default()
            .extract(&html, "https://docs.example.com/guide")
            .unwrap();
        assert_eq!(extracted.content_type, ContentType::Documentation);
    }
}
