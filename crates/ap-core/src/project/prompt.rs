/// Token in a prompt template that is replaced by the current keyword.
pub const KEYWORD_PLACEHOLDER: &str = "<keyword>";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "Generate content 2000-words for the post about <keyword> with 7-10 heading 2. Intro and conclusion must contain keyword (heading 2 is better if it has keyword there).

Please write an engaging, informative article that:
- Uses the keyword naturally throughout the content
- Includes practical tips and actionable advice
- Has a clear structure with proper headings
- Provides value to readers
- Maintains a conversational tone";

/// Substitutes every occurrence of the placeholder with `keyword`.
pub fn fill_prompt(template: &str, keyword: &str) -> String {
    template.replace(KEYWORD_PLACEHOLDER, keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_placeholder() {
        let prompt = fill_prompt("<keyword>: all about <keyword>", "tea");
        assert_eq!(prompt, "tea: all about tea");
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        assert_eq!(fill_prompt("static prompt", "tea"), "static prompt");
    }

    #[test]
    fn default_template_contains_placeholder() {
        assert!(DEFAULT_PROMPT_TEMPLATE.contains(KEYWORD_PLACEHOLDER));
    }
}
