use std::sync::OnceLock;

use regex::Regex;

const MAX_SLUG_LEN: usize = 50;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\-]").expect("valid slug regex"))
}

fn hyphen_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("valid hyphen regex"))
}

/// Derives a URL-safe slug from a raw keyword.
///
/// lowercase → spaces/underscores to `-` → drop anything outside `[a-z0-9-]`
/// → collapse `-` runs → trim `-` → at most 50 characters.
pub fn slugify(keyword: &str) -> String {
    let lowered = keyword.to_lowercase().replace([' ', '_'], "-");
    let stripped = disallowed().replace_all(&lowered, "");
    let collapsed = hyphen_runs().replace_all(&stripped, "-");
    let trimmed = collapsed.trim_matches('-');

    // Only ASCII survives the filter, so byte truncation is char-safe.
    trimmed[..trimmed.len().min(MAX_SLUG_LEN)].to_string()
}
