//! Slug sanitisation and uniqueness.

use std::sync::LazyLock;

use regex::Regex;
use wordepress_sdk::text::strip_tags;

static ENTITY_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"&[^\s;]+?;").ok());

/// Turn a title or requested slug into a URL slug.
///
/// Tags and entities are removed, the result is lowercased, dots and
/// whitespace become dashes, anything outside `[a-z0-9_-]` is dropped and
/// runs of dashes collapse to one.
pub fn sanitize_title(input: &str) -> String {
    let stripped = strip_tags(input);
    let stripped = match ENTITY_RE.as_ref() {
        Some(re) => re.replace_all(&stripped, "-").into_owned(),
        None => stripped,
    };

    let mut slug = String::with_capacity(stripped.len());
    for c in stripped.chars().flat_map(char::to_lowercase) {
        let mapped = match c {
            'a'..='z' | '0'..='9' | '_' => Some(c),
            '-' | '.' | '/' => Some('-'),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        };
        if let Some(m) = mapped {
            if m == '-' && slug.ends_with('-') {
                continue;
            }
            slug.push(m);
        }
    }

    slug.trim_matches('-').to_string()
}

/// Make `base` unique by appending `-2`, `-3`, … until `taken` rejects it.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut suffix = 2u64;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
