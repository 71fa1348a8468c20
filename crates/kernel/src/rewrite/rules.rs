//! Compiled rewrite rules and internal query strings.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;
use wordepress_sdk::types::{PostTypeDefinition, RewritePosition, RewriteRule};

static MATCHES_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$matches\[(\d+)\]").ok());

/// Rule generated for every post type with a rewrite slug.
pub fn generated_rule(def: &PostTypeDefinition) -> Option<RewriteRule> {
    let slug = def.rewrite_slug.as_deref()?;
    Some(RewriteRule::new(
        format!("{slug}/(.+?)/?$"),
        format!("index.php?post_type={}&pagename=$matches[1]", def.machine_name),
        RewritePosition::Bottom,
    ))
}

/// Assemble a full rule set: `top` extras, generated rules, then `bottom` extras.
pub fn assemble(extra: &[RewriteRule], types: &[PostTypeDefinition]) -> Vec<RewriteRule> {
    let by_position = |position: RewritePosition| extra.iter().filter(move |r| r.position == position).cloned();

    by_position(RewritePosition::Top)
        .chain(types.iter().filter_map(generated_rule))
        .chain(by_position(RewritePosition::Bottom))
        .collect()
}

struct CompiledRule {
    rule: RewriteRule,
    regex: Regex,
}

/// An ordered, compiled rule set. The first matching rule wins.
#[derive(Default)]
pub struct RewriteRules {
    rules: Vec<CompiledRule>,
}

impl RewriteRules {
    /// Compile rules, anchoring each at the start of the path.
    ///
    /// Rules whose pattern does not compile are skipped.
    pub fn compile(rules: Vec<RewriteRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|rule| match Regex::new(&format!("^(?:{})", rule.regex)) {
                Ok(regex) => Some(CompiledRule { rule, regex }),
                Err(e) => {
                    warn!(regex = %rule.regex, error = %e, "skipping invalid rewrite rule");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> Vec<RewriteRule> {
        self.rules.iter().map(|c| c.rule.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Match a request path (leading and trailing slashes ignored) and
    /// return the internal query of the first matching rule.
    pub fn resolve(&self, path: &str) -> Option<QueryVars> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return None;
        }
        self.rules.iter().find_map(|c| {
            c.regex
                .captures(path)
                .map(|caps| QueryVars::parse(&substitute(&c.rule.query, &caps)))
        })
    }
}

/// Replace `$matches[n]` with capture group `n` (empty when absent).
fn substitute(template: &str, caps: &Captures<'_>) -> String {
    let Some(re) = MATCHES_RE.as_ref() else {
        return template.to_string();
    };
    re.replace_all(template, |m: &Captures<'_>| {
        m[1].parse::<usize>()
            .ok()
            .and_then(|n| caps.get(n))
            .map(|c| c.as_str().to_string())
            .unwrap_or_default()
    })
    .into_owned()
}

/// Decoded internal query variables, e.g. `post_type` and `pagename`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryVars(BTreeMap<String, String>);

impl QueryVars {
    /// Parse `index.php?a=b&c=d` (or just `a=b&c=d`).
    ///
    /// Values are percent-decoded with `+` as space, then trimmed.
    pub fn parse(query: &str) -> Self {
        let query = query.split_once('?').map_or(query, |(_, q)| q);
        let vars = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let key = decode_component(key);
                (!key.is_empty()).then(|| (key, decode_component(value).trim().to_string()))
            })
            .collect();
        Self(vars)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn post_type(&self) -> Option<&str> {
        self.get("post_type")
    }

    pub fn pagename(&self) -> Option<&str> {
        self.get("pagename")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Re-encode as a query string.
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-decode a query component, with `+` as space.
pub(crate) fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
