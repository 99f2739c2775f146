use crate::core::models::{ContentType, Conversation, ExtractedContent};

/// Characters of page content sent with a summary request.
pub const MAX_CONTENT_LENGTH: usize = 12_000;

/// Characters of page content repeated in every follow-up prompt.
pub const MAX_CHAT_CONTEXT_LENGTH: usize = 2_000;

/// Max length of a follow-up question (after which we truncate).
pub const MAX_USER_INPUT_LEN: usize = 2_000;

pub const TRUNCATION_MARKER: &str = "...[content truncated]";

/// Terms that mark research / engineering heavy pages.
pub const TECHNICAL_KEYWORDS: &[&str] = &[
    "research",
    "arxiv",
    "preprint",
    "openai",
    "anthropic",
    "deepmind",
    "hugging face",
    "nvidia",
    "machine learning",
    "deep learning",
    "neural network",
    "transformer",
    "large language model",
    "llm",
    "gpt",
    "fine-tuning",
    "fine tuning",
    "reinforcement learning",
    "diffusion model",
    "embedding",
    "benchmark",
    "dataset",
    "inference",
    "parameters",
];

pub const CONTENT_TYPE_INSTRUCTIONS: &[(ContentType, &str)] = &[
    (
        ContentType::Article,
        "This is a news article. Focus on the main story, key facts, and important details.",
    ),
    (
        ContentType::Blog,
        "This is a blog post. Summarize the main points and key insights shared by the author.",
    ),
    (
        ContentType::Documentation,
        "This is technical documentation. Focus on the main concepts, procedures, and important information.",
    ),
    (
        ContentType::General,
        "This is web content. Provide a clear summary of the main information and key points.",
    ),
];

#[must_use]
pub fn instruction_for(content_type: ContentType) -> &'static str {
    let lookup = |wanted: ContentType| {
        CONTENT_TYPE_INSTRUCTIONS
            .iter()
            .find(|(ct, _)| *ct == wanted)
            .map(|(_, line)| *line)
    };
    lookup(content_type)
        .or_else(|| lookup(ContentType::General))
        .unwrap_or_default()
}

#[must_use]
pub fn is_technical(title: &str, content: &str) -> bool {
    let haystack = format!("{title} {content}").to_lowercase();
    TECHNICAL_KEYWORDS.iter().any(|k| haystack.contains(k))
}

/// Cut `content` to `max_chars` characters, appending the truncation marker
/// only when something was dropped.
#[must_use]
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &content[..byte_idx]),
        None => content.to_string(),
    }
}

#[must_use]
pub fn build_prompt(content: &str, title: &str, content_type: ContentType) -> String {
    let truncated = truncate_content(content, MAX_CONTENT_LENGTH);
    let instruction = instruction_for(content_type);

    if is_technical(title, content) {
        format!(
            "Summarize this technical {content_type} titled \"{title}\" in 80-120 words.\n\n\
             {instruction}\n\n\
             Format:\n\
             - Open with one sentence stating the core contribution or announcement.\n\
             - Follow with 3-5 bullet points covering methods, results and implications.\n\
             - Preserve exact numbers, metrics, model names and benchmark results.\n\
             - Skip background, marketing language and author biographies.\n\n\
             Content:\n{truncated}"
        )
    } else {
        format!(
            "Summarize this {content_type} titled \"{title}\" in 50-80 words.\n\n\
             {instruction}\n\n\
             Be aggressively concise: keep only the main point and the two or three facts a reader \
             needs. No introductions, no filler, no repetition of the title.\n\n\
             Content:\n{truncated}"
        )
    }
}

/// Follow-up prompt: page context, prior turns and the new question.
#[must_use]
pub fn build_chat_context(
    page: Option<&ExtractedContent>,
    conversation: &Conversation,
    question: &str,
) -> String {
    let title = page.map_or("Unknown", |p| p.title.as_str());
    let content = page
        .map(|p| p.content.chars().take(MAX_CHAT_CONTEXT_LENGTH).collect::<String>())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "No content available".to_string());

    format!(
        "Based on our previous conversation about this page and the following context:\n\n\
         Page Title: {title}\n\
         Page Content: {content}...\n\n\
         Previous conversation:\n{history}\n\n\
         User's new question: {question}\n\n\
         Please provide a helpful response based on the page content and our conversation history.",
        history = conversation.transcript(),
    )
}

/// Remove control characters (keeping line breaks and tabs) and hard-truncate.
#[must_use]
pub fn sanitize_user_input(raw: &str) -> String {
    raw.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .take(MAX_USER_INPUT_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}
