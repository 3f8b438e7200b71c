use super::SearchError;
use regex::RegexBuilder;
use serde::Serialize;

/// A slice of text, flagged when it matched the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Split `text` around case-insensitive occurrences of `query`.
///
/// The query is escaped first, so `a.b`, `(x` or `$5` are taken literally.
/// An empty query yields the whole text as one unmatched segment.
pub fn highlight(text: &str, query: &str) -> Result<Vec<Segment>, SearchError> {
    if query.is_empty() {
        return Ok(vec![Segment {
            text: text.to_string(),
            matched: false,
        }]);
    }

    let re = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()?;

    let mut segments = Vec::new();
    let mut cursor = 0;
    for m in re.find_iter(text) {
        if m.start() > cursor {
            segments.push(Segment {
                text: text[cursor..m.start()].to_string(),
                matched: false,
            });
        }
        segments.push(Segment {
            text: m.as_str().to_string(),
            matched: true,
        });
        cursor = m.end();
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment {
            text: text[cursor..].to_string(),
            matched: false,
        });
    }
    Ok(segments)
}
