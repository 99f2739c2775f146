use page_summarizer::ai::build_prompt;
use page_summarizer::core::models::ContentType;
use page_summarizer::extract::{ContentExtractor, ExtractorRules};

const SENTENCE: &str = "Residents gathered at the hall to discuss weekend library hours.";

fn news_page(paragraphs: usize) -> String {
    let body: String = (0..paragraphs).map(|_| format!("<p>{SENTENCE}</p>")).collect();
    format!(
        "<html><head><title>Town Council Extends Library Hours</title>\
         <style>p {{ color: red; }}</style></head>\
         <body>\
         <nav><a href=\"/\">Home</a> <a href=\"/sports\">Sports and everything else in town</a></nav>\
         <header><h1>Town Council Extends Library Hours</h1></header>\
         <article>{body}<aside class=\"related-posts\"><p>Related: five other stories you should read today</p></aside></article>\
         <footer><p>Copyright notice for the local newspaper and its partners</p></footer>\
         <script>var tracking = 'should never appear in the output';</script>\
         </body></html>"
    )
}

#[test]
fn test_news_article_extraction() {
    let extracted = ContentExtractor::default()
        .extract(&news_page(50), "https://news.example.com/2024/10/council-vote")
        .unwrap();

    assert_eq!(extracted.title, "Town Council Extends Library Hours");
    assert_eq!(extracted.content_type, ContentType::Article);
    assert_eq!(extracted.word_count, 500);
    assert_eq!(extracted.url, "https://news.example.com/2024/10/council-vote");

    assert!(!extracted.content.contains("Sports"));
    assert!(!extracted.content.contains("Related:"));
    assert!(!extracted.content.contains("Copyright"));
    assert!(!extracted.content.contains("tracking"));
    assert!(!extracted.content.contains("\n\n\n"));
}

#[test]
fn test_news_article_uses_general_template() {
    let extracted = ContentExtractor::default()
        .extract(&news_page(50), "https://news.example.com/2024/10/council-vote")
        .unwrap();

    let prompt = build_prompt(&extracted.content, &extracted.title, extracted.content_type);
    assert!(prompt.contains("50-80 words"));
    assert!(prompt.contains("This is a news article."));
}

#[test]
fn test_summarizable_threshold() {
    let extractor = ContentExtractor::default();
    let url = "https://news.example.com/2024/10/council-vote";

    // 4 paragraphs = 40 words, enough text to extract but not to summarize
    assert!(extractor.extract(&news_page(4), url).is_some());
    assert!(!extractor.is_summarizable(&news_page(4), url));
    assert!(extractor.is_summarizable(&news_page(5), url));
}

#[test]
fn test_short_page_is_not_extractable() {
    let html = "<html><body><p>Too short to bother with.</p></body></html>";
    assert!(
        ContentExtractor::default()
            .extract(html, "https://example.com/")
            .is_none()
    );
}

#[test]
fn test_invalid_custom_selector_is_reported() {
    let rules = ExtractorRules {
        container_selectors: vec!["article[".to_string()],
        ..ExtractorRules::default()
    };
    let err = ContentExtractor::new(rules)
        .try_extract(&news_page(50), "https://news.example.com/")
        .unwrap_err();
    assert!(err.to_string().contains("invalid selector"));
}
