//! # Text Normalizer
//! Raw filing markup → clean, whitespace-collapsed ASCII text.
//!
//! Total function: inputs that are not HTML degrade to best-effort text
//! extraction rather than failing. Re-normalizing already-normalized text
//! yields the same text.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

/// Normalize one document. Passes run in a fixed order: drop script/style
/// elements with their content, replace remaining tags with a space, fold
/// newline runs, fold whitespace runs, blank out common HTML entities,
/// blank out non-ASCII runs, fold once more, trim.
pub fn normalize(raw: &str) -> String {
    static RE_SCRIPT_STYLE: OnceCell<Regex> = OnceCell::new();
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_NEWLINES: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    static RE_ENTITIES: OnceCell<Regex> = OnceCell::new();
    static RE_NON_ASCII: OnceCell<Regex> = OnceCell::new();

    let mut out = re(
        &RE_SCRIPT_STYLE,
        r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>",
    )
    .replace_all(raw, " ")
    .to_string();

    out = re(&RE_TAGS, r"(?is)</?[^>]+>")
        .replace_all(&out, " ")
        .to_string();
    out = re(&RE_NEWLINES, r"\n+").replace_all(&out, "\n").to_string();
    out = re(&RE_WS, r"\s+").replace_all(&out, " ").to_string();
    out = re(&RE_ENTITIES, r"&(?:nbsp|lt|gt|amp|quot|apos);")
        .replace_all(&out, " ")
        .to_string();
    out = re(&RE_NON_ASCII, r"[^\x00-\x7F]+")
        .replace_all(&out, " ")
        .to_string();
    // Entity and non-ASCII replacement can leave adjacent spaces behind.
    out = re(&RE_WS, r"\s+").replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_ok() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn strips_script_and_style_with_content() {
        let s = "<html><head><style>p { color: red; }</style>\
                 <script>alert('x');</script></head>\
                 <body><p>Item 1A. Risk Factors</p></body></html>";
        assert_eq!(normalize(s), "Item 1A. Risk Factors");
    }

    #[test]
    fn tags_become_element_separators() {
        let s = "<td>Revenue</td><td>383,285</td>";
        assert_eq!(normalize(s), "Revenue 383,285");
    }

    #[test]
    fn entities_and_non_ascii_become_spaces() {
        let s = "Net&nbsp;sales \u{2014} fiscal\u{00A0}2024";
        let n = normalize(s);
        assert_eq!(n, "Net sales fiscal 2024");
        assert!(n.is_ascii());
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(normalize("a \n\n\t  b\n\nc"), "a b c");
    }

    #[test]
    fn idempotent_on_markup() {
        let s = "<p>Total&nbsp;assets:\n\n  $352,583\u{00A0}million</p>";
        let once = normalize(s);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn idempotent_on_plain_text() {
        let s = "already clean text";
        assert_eq!(normalize(s), s);
    }
}
