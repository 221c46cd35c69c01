use regex::Regex;
use std::sync::OnceLock;

use ap_core::ports::GeneratedArticle;

const FALLBACK_TITLE: &str = "Generated Article";
const MAX_TITLE_CHARS: usize = 200;
const HEADING_MAX_CHARS: usize = 100;

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)TITLE:\s*(.+?)(?:\n|CONTENT:)").expect("valid regex"))
}

fn content_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)CONTENT:\s*(.+)").expect("valid regex"))
}

fn heading_marks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#+\s*").expect("valid regex"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"))
}

fn html_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

/// Split a generator answer into title and HTML body.
///
/// Expects `TITLE:` / `CONTENT:` markers; without them the first line is the
/// title and the rest is the body.
pub fn parse_article(text: &str) -> GeneratedArticle {
    let title_match = title_re().captures(text).and_then(|c| c.get(1));
    let content_match = content_re().captures(text).and_then(|c| c.get(1));

    let (title, body) = match (title_match, content_match) {
        (Some(t), Some(c)) => (t.as_str().trim().to_string(), c.as_str().trim().to_string()),
        _ => {
            let trimmed = text.trim();
            let mut lines = trimmed.split('\n');
            let first = lines.next().map(str::trim).unwrap_or_default();
            let rest: Vec<&str> = lines.collect();

            let title = if first.is_empty() {
                FALLBACK_TITLE.to_string()
            } else {
                first.to_string()
            };
            let body = if rest.is_empty() {
                text.to_string()
            } else {
                rest.join("\n").trim().to_string()
            };
            (title, body)
        }
    };

    let title = heading_marks_re().replace(&title, "");
    let title = bold_re().replace_all(&title, "$1");
    let title: String = title.chars().take(MAX_TITLE_CHARS).collect();

    let body = if html_tag_re().is_match(&body) {
        body
    } else {
        plain_text_to_html(&body)
    };

    GeneratedArticle { title, body }
}

/// Blank-line separated paragraphs to `<h2>`/`<p>`. Short lines without a
/// trailing period read as headings.
pub fn plain_text_to_html(text: &str) -> String {
    let mut html = String::new();
    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if para.chars().count() < HEADING_MAX_CHARS && !para.ends_with('.') {
            html.push_str(&format!("<h2>{para}</h2>\n"));
        } else {
            html.push_str(&format!("<p>{para}</p>\n"));
        }
    }
    html
}
