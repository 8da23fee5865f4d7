//! Extracts the lines of a matched file most relevant to a query

use serde::Serialize;

/// Lines returned per match
pub const MAX_CONTEXT_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    /// 1-based
    pub line_number: usize,
    pub text: String,
    pub score: usize,
}

/// Coarse static counts; informational only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub functions: usize,
    pub comments: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchContext {
    pub lines: Vec<ContextLine>,
    pub summary: ContentSummary,
}

/// Score each line by how many query words it contains (case-insensitive
/// substring match) and keep the best [`MAX_CONTEXT_LINES`] with a non-zero
/// score. The sort is stable, so the earlier line wins a tie.
pub fn extract_context(content: &str, query: &str) -> MatchContext {
    let query_lower = query.to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();

    let mut scored: Vec<ContextLine> = content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_lower = line.to_lowercase();
            let score = words.iter().filter(|w| line_lower.contains(*w)).count();
            (score > 0).then(|| ContextLine {
                line_number: idx + 1,
                text: line.trim_end().to_string(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_CONTEXT_LINES);

    MatchContext {
        lines: scored,
        summary: summarize(content),
    }
}

/// Count declaration-looking lines, comment lines and total lines
pub fn summarize(content: &str) -> ContentSummary {
    let mut summary = ContentSummary::default();

    for line in content.lines() {
        summary.lines += 1;
        let trimmed = line.trim_start();
        if is_comment(trimmed) {
            summary.comments += 1;
        } else if is_declaration(trimmed) {
            summary.functions += 1;
        }
    }

    summary
}

/// First `max_chars` characters of `content`, with `...` when cut
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}

const COMMENT_PREFIXES: [&str; 6] = ["//", "/*", "*", "--", "<!--", "\"\"\""];

fn is_comment(line: &str) -> bool {
    if COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return true;
    }
    // `#[attr]`, `#!` and preprocessor lines are code
    line.starts_with('#')
        && !line.starts_with("#[")
        && !line.starts_with("#!")
        && !line.starts_with("#include")
        && !line.starts_with("#define")
}

const MODIFIERS: [&str; 9] = [
    "pub", "pub(crate)", "export", "default", "async", "static", "public", "private", "protected",
];

const DECLARATION_KEYWORDS: [&str; 14] = [
    "function", "def", "class", "fn", "const", "let", "var", "struct", "enum", "trait",
    "interface", "func", "impl", "type",
];

fn is_declaration(line: &str) -> bool {
    let mut words = line
        .split(|c: char| c.is_whitespace() || c == '(' || c == '{' || c == '<')
        .filter(|w| !w.is_empty())
        .skip_while(|w| MODIFIERS.contains(w));

    words
        .next()
        .map(|first| DECLARATION_KEYWORDS.contains(&first))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "// Math helpers
export function add(a, b) {
  return a + b;
}

# not really python but a comment
const total = add(1, 2);
pub async fn fetch_user(id: u64) -> User {}
#[derive(Debug)]
struct Point { x: i32 }";

    #[test]
    fn test_summary_counts() {
        let summary = summarize(SAMPLE);
        assert_eq!(summary.lines, 10);
        assert_eq!(summary.comments, 2);
        // add, total, fetch_user, Point
        assert_eq!(summary.functions, 4);
    }

    #[test]
    fn test_top_lines_scored_by_query_words() {
        let ctx = extract_context(SAMPLE, "add total");
        let numbers: Vec<usize> = ctx.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers[0], 7);
        assert_eq!(ctx.lines[0].score, 2);
        assert!(ctx.lines[1..].iter().all(|l| l.score == 1));
        assert_eq!(&numbers[1..], &[2]);
    }

    #[test]
    fn test_case_insensitive() {
        let ctx = extract_context("let X = FETCH();\nother", "fetch");
        assert_eq!(ctx.lines.len(), 1);
        assert_eq!(ctx.lines[0].line_number, 1);
    }

    #[test]
    fn test_ties_keep_line_order_and_cap() {
        let content = (1..=8).map(|i| format!("match {i}")).collect::<Vec<_>>().join("\n");
        let ctx = extract_context(&content, "match");
        let numbers: Vec<usize> = ctx.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_query_yields_no_lines() {
        let ctx = extract_context(SAMPLE, "   ");
        assert!(ctx.lines.is_empty());
        assert_eq!(ctx.summary.lines, 10);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("héllo", 2), "hé...");
    }
}
