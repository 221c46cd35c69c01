use std::path::Path;

/// Layout of an imported keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordFormat {
    /// One keyword per line.
    Lines,
    /// Comma- and line-separated.
    Csv,
}

impl KeywordFormat {
    /// `.csv` files are comma-separated, everything else is line-based.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => KeywordFormat::Csv,
            _ => KeywordFormat::Lines,
        }
    }
}

/// Splits imported text into keywords, trimming entries and dropping blanks.
/// Order and duplicates are preserved.
pub fn parse_keywords(text: &str, format: KeywordFormat) -> Vec<String> {
    let entries: Box<dyn Iterator<Item = &str>> = match format {
        KeywordFormat::Lines => Box::new(text.lines()),
        KeywordFormat::Csv => Box::new(text.lines().flat_map(|line| line.split(','))),
    };

    entries
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
