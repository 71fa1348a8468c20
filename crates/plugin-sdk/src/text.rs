//! Text helpers for plugin accessors.

use std::sync::LazyLock;

use regex::Regex;

/// Comments, then tags. A `<` followed by whitespace is literal text. A `>`
/// inside a quoted attribute value does not close the tag; an unterminated
/// tag or quote swallows the rest of the input.
static TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let quoted = r#""[^"]*(?:"|\z)|'[^']*(?:'|\z)"#;
    Regex::new(&format!(
        r#"(?s)<!--.*?(?:-->|\z)|<(?:(?:{quoted}|[^\s>"'])(?:{quoted}|[^'">])*)?(?:>|\z)"#
    ))
    .ok()
});

/// Remove every markup tag from `input`, keeping the text between tags.
///
/// Entities are left untouched.
pub fn strip_tags(input: &str) -> String {
    match TAG_RE.as_ref() {
        Some(re) => re.replace_all(input, "").into_owned(),
        None => input.to_string(),
    }
}
