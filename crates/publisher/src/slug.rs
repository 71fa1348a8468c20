//! Slug qualification and sanitisation.
//!
//! Every published post is addressed by `{product}-{tag}-{base}`, where `base`
//! is the markdown file stem. The site's own slug sanitiser is far more
//! thorough than this; in practice the only unusual characters we meet are the
//! dots of a version string, so anything outside `[a-z0-9-.]` is an error
//! instead of a guess.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PublishError, Result};

static SAFE_SLUG_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-.]+$").ok());

/// Reject unexpected characters and turn dots into dashes.
pub fn sanitise_slug(slug: &str) -> Result<String> {
    let safe = SAFE_SLUG_RE
        .as_ref()
        .is_some_and(|re| re.is_match(slug));
    if !safe {
        return Err(PublishError::UnsafeSlug(slug.to_string()));
    }
    Ok(slug.replace('.', "-"))
}

pub fn qualify_slug(product: &str, tag: &str, base: &str) -> String {
    format!("{product}-{tag}-{base}")
}

/// Qualify then sanitise.
pub fn post_slug(product: &str, tag: &str, base: &str) -> Result<String> {
    sanitise_slug(&qualify_slug(product, tag, base))
}
