//! Markdown rendering and HTML rewriting.

use std::path::Path;
use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::{Captures, Regex};

use crate::error::Result;
use crate::image::Image;
use crate::slug::post_slug;

static ANCHOR_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"<a href="([^#"]*)"#).ok());
static IMG_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"<img src="([^"]*)""#).ok());

/// Source-tree links look like `/site/<path>.md`.
const SITE_PREFIX: &str = "/site/";

/// Render markdown to HTML. Fenced code blocks are supported and void
/// elements are written XHTML style (`<br />`).
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Rewrite rendered HTML for publication.
///
/// - `<a href="/site/x/y.md"` links point at the published documentation path.
/// - `<img src="rel"` images are read relative to `source_dir` and pointed at
///   their content-addressed upload.
/// - Backslashes become `&#092;` so the site does not strip them.
///
/// Returns the HTML with every image it references.
pub fn rewrite_html(
    product: &str,
    tag: &str,
    source_dir: &Path,
    html: &str,
) -> Result<(String, Vec<Image>)> {
    let html = try_replace_all(ANCHOR_RE.as_ref(), html, |caps| {
        rewrite_anchor(product, tag, &caps[0], &caps[1])
    })?;

    let mut images = Vec::new();
    let html = try_replace_all(IMG_RE.as_ref(), &html, |caps| {
        let image = Image::read(&source_dir.join(&caps[1]))?;
        let replaced = format!(r#"<img src="{}""#, image.upload_path());
        images.push(image);
        Ok(replaced)
    })?;

    Ok((html.replace('\\', "&#092;"), images))
}

fn rewrite_anchor(product: &str, tag: &str, whole: &str, href: &str) -> Result<String> {
    let Some(path) = href
        .strip_prefix(SITE_PREFIX)
        .and_then(|rest| rest.strip_suffix(".md"))
    else {
        return Ok(whole.to_string());
    };

    let slugs = path
        .split('/')
        .map(|segment| post_slug(product, tag, segment))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(r#"<a href="/documentation/{}"#, slugs.join("/")))
}

/// `Regex::replace_all` with a fallible replacement.
fn try_replace_all(
    re: Option<&Regex>,
    haystack: &str,
    mut replace: impl FnMut(&Captures<'_>) -> Result<String>,
) -> Result<String> {
    let Some(re) = re else {
        return Ok(haystack.to_string());
    };

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for caps in re.captures_iter(haystack) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&haystack[last..whole.start()]);
        out.push_str(&replace(&caps)?);
        last = whole.end();
    }
    out.push_str(&haystack[last..]);
    Ok(out)
}
