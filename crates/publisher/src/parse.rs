//! Markdown front matter.
//!
//! A source file opens with a header block:
//!
//! ```text
//! ---
//! title: Installing the agent
//! menu_order: 20
//! ---
//! ```
//!
//! Both attributes are required and no others are accepted.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PublishError, Result};

const DELIMITER: &str = "---";

static ATTRIBUTE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\w+):\s*(.+?)\s*$").ok());

/// Validated header attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub menu_order: i64,
}

/// Split a source file into its raw header attributes and body.
///
/// Every body line, including the last, is terminated by `\n`.
pub fn split_front_matter(source: &str) -> Result<(BTreeMap<String, String>, String)> {
    let mut lines = source.lines();
    if lines.next() != Some(DELIMITER) {
        return Err(PublishError::MissingDelimiter);
    }

    let mut attributes = BTreeMap::new();
    loop {
        let line = lines.next().ok_or(PublishError::UnexpectedEof)?;
        if line == DELIMITER {
            break;
        }
        let captures = ATTRIBUTE_RE
            .as_ref()
            .and_then(|re| re.captures(line))
            .ok_or_else(|| PublishError::BadAttribute(line.to_string()))?;
        attributes.insert(captures[1].to_string(), captures[2].to_string());
    }

    let mut body = String::with_capacity(source.len());
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }

    Ok((attributes, body))
}

/// Check the header holds exactly a non-empty title and an integer menu order.
pub fn validate_attributes(mut attributes: BTreeMap<String, String>) -> Result<FrontMatter> {
    let title = attributes.remove("title").unwrap_or_default();
    if title.is_empty() {
        return Err(PublishError::MissingTitle);
    }

    let raw_order = attributes.remove("menu_order").unwrap_or_default();
    let menu_order = raw_order
        .parse()
        .map_err(|_| PublishError::InvalidMenuOrder(raw_order.clone()))?;

    if !attributes.is_empty() {
        let unknown: Vec<String> = attributes
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        return Err(PublishError::UnknownAttributes(unknown.join(" ")));
    }

    Ok(FrontMatter { title, menu_order })
}

/// Split and validate in one step.
pub fn parse_front_matter(source: &str) -> Result<(FrontMatter, String)> {
    let (attributes, body) = split_front_matter(source)?;
    Ok((validate_attributes(attributes)?, body))
}
