//! Rendering of search hits into the bulleted snippet block.

use crate::tavily::SearchResult;

/// At most this many hits make it into the block.
pub const MAX_RESULTS: usize = 5;
/// Upper bound for a shortened hit body, marker included.
pub const SNIPPET_WIDTH: usize = 300;
/// Appended when a body had to be cut.
pub const TRUNCATION_MARKER: &str = "[...]";

/// Shortens `text` to at most `width` characters, cutting at a word boundary.
///
/// Text that already fits is returned unchanged. Otherwise whitespace is
/// collapsed, whole words are kept while they fit, and ` [...]` is appended.
/// Words are never split: if even the first word does not fit, the result
/// is the bare marker.
pub fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    // room for the words plus " [...]"
    let budget = width.saturating_sub(TRUNCATION_MARKER.len() + 1);
    let mut out = String::new();
    let mut used = 0usize;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        let sep = usize::from(!out.is_empty());
        if used + sep + len > budget {
            break;
        }
        if sep == 1 {
            out.push(' ');
        }
        out.push_str(word);
        used += sep + len;
    }

    if out.is_empty() {
        TRUNCATION_MARKER.to_string()
    } else {
        format!("{out} {TRUNCATION_MARKER}")
    }
}

/// Formats one hit as `- **{title}**: {content} ([source]({url}))`.
pub fn format_result(r: &SearchResult) -> String {
    format!(
        "- **{}**: {} ([source]({}))",
        r.title,
        shorten(&r.content, SNIPPET_WIDTH),
        r.url
    )
}

/// Formats the first [`MAX_RESULTS`] hits, in service order, one per line.
pub fn format_block(results: &[SearchResult]) -> String {
    results
        .iter()
        .take(MAX_RESULTS)
        .map(format_result)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(i: usize) -> SearchResult {
        SearchResult {
            title: format!("Title {i}"),
            content: format!("content {i}"),
            url: format!("https://example.org/{i}"),
        }
    }

    #[test]
    fn short_content_is_unchanged() {
        let exact = "a".repeat(SNIPPET_WIDTH);
        assert_eq!(shorten(&exact, SNIPPET_WIDTH), exact);
        assert_eq!(shorten("  spaced   out ", SNIPPET_WIDTH), "  spaced   out ");
    }

    #[test]
    fn long_content_is_cut_at_word_boundary() {
        let words: Vec<String> = (0..200).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let out = shorten(&text, SNIPPET_WIDTH);
        assert!(out.chars().count() <= SNIPPET_WIDTH);
        assert!(out.ends_with(TRUNCATION_MARKER));
        let body = out.trim_end_matches(TRUNCATION_MARKER).trim_end();
        assert!(body.split(' ').all(|w| words.iter().any(|x| x == w)));
    }

    #[test]
    fn overlong_first_word_is_never_split() {
        let url = format!("https://example.org/{} tail", "a".repeat(400));
        assert_eq!(shorten(&url, SNIPPET_WIDTH), TRUNCATION_MARKER);
        assert_eq!(shorten(&"é".repeat(1000), SNIPPET_WIDTH), TRUNCATION_MARKER);
    }

    #[test]
    fn block_keeps_at_most_five_in_order() {
        let hits: Vec<_> = (0..9).map(hit).collect();
        let block = format_block(&hits);
        let lines: Vec<_> = block.lines().collect();
        assert_eq!(lines.len(), MAX_RESULTS);
        assert_eq!(
            lines[0],
            "- **Title 0**: content 0 ([source](https://example.org/0))"
        );
        assert!(lines[4].contains("Title 4"));
    }

    #[test]
    fn empty_results_render_empty_block() {
        assert_eq!(format_block(&[]), "");
    }
}
