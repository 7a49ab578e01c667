//! Escape fixup for converted markdown.
//!
//! HTML to Markdown conversion escapes every backslash it sees, which turns
//! LaTeX control sequences such as `\alpha` into `\\alpha`. This pass
//! collapses the doubled backslashes back, but only inside `$...$` and
//! `$$...$$` spans. Everything outside a math span is left alone.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// `$$...$$` is tried before `$...$` at every position; neither span may
/// contain a `$` or be empty.
fn math_span_regex() -> &'static Regex {
    static MATH_SPAN: OnceLock<Regex> = OnceLock::new();
    MATH_SPAN.get_or_init(|| {
        Regex::new(r"\$\$([^$]+?)\$\$|\$([^$]+?)\$").expect("math span pattern is valid")
    })
}

/// Collapse `\\` into `\` inside every math span of `markdown`.
pub fn fix_math_escapes(markdown: &str) -> String {
    math_span_regex()
        .replace_all(markdown, |caps: &Captures| {
            let (delimiter, body) = match (caps.get(1), caps.get(2)) {
                (Some(body), _) => ("$$", body.as_str()),
                (None, Some(body)) => ("$", body.as_str()),
                // One of the two groups always participates in a match
                (None, None) => return caps[0].to_string(),
            };
            format!("{delimiter}{}{delimiter}", body.replace(r"\\", r"\"))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_double_escape_collapsed() {
        assert_eq!(fix_math_escapes(r"$\\alpha$"), r"$\alpha$");
    }

    #[test]
    fn test_block_double_escape_collapsed() {
        assert_eq!(
            fix_math_escapes(r"$$\\frac{a}{b} + \\beta$$"),
            r"$$\frac{a}{b} + \beta$$"
        );
    }

    #[test]
    fn test_text_outside_math_untouched() {
        let input = r"Path C:\\temp and $\\gamma$ then \\n";
        assert_eq!(fix_math_escapes(input), r"Path C:\\temp and $\gamma$ then \\n");
    }

    #[test]
    fn test_already_single_escaped_is_unchanged() {
        let input = r"Euler: $e^{i\pi} + 1 = 0$ and $$\sum_{k=1}^n k$$";
        assert_eq!(fix_math_escapes(input), input);
    }

    #[test]
    fn test_fixup_is_idempotent_on_its_output() {
        let once = fix_math_escapes(r"$\\alpha$ and $$\\beta$$");
        assert_eq!(fix_math_escapes(&once), once);
    }

    #[test]
    fn test_quadruple_backslash_becomes_double() {
        // A LaTeX line break written as \\ arrives as \\\\
        assert_eq!(fix_math_escapes(r"$$a \\\\ b$$"), r"$$a \\ b$$");
    }

    #[test]
    fn test_multiple_spans_on_one_line() {
        assert_eq!(
            fix_math_escapes(r"$\\a$ text $\\b$"),
            r"$\a$ text $\b$"
        );
    }

    #[test]
    fn test_empty_and_unbalanced_spans() {
        assert_eq!(fix_math_escapes("$$"), "$$");
        assert_eq!(fix_math_escapes(r"costs $5 \\ more"), r"costs $5 \\ more");
        // The single-dollar span inside an unbalanced double opener still matches
        assert_eq!(fix_math_escapes(r"$$\\x$"), r"$$\x$");
    }

    #[test]
    fn test_no_math_returns_input() {
        let input = "# Title\n\nPlain *markdown* text.";
        assert_eq!(fix_math_escapes(input), input);
    }
}
