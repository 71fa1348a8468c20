//! Source macros.
//!
//! Documents may call a small set of functions from inside actions. Actions
//! are expanded twice: once on the markdown (`{{ ... }}`) and once on the
//! rendered HTML (`[[ ... ]]`). The second pass exists for markup the
//! markdown renderer would otherwise mangle; string arguments there should be
//! backtick-quoted, since the renderer escapes double quotes.
//!
//! ```text
//! {{ include "snippets/install.md" }}
//! [[ open_details ]] ... [[ close_details ]]
//! [[ open_tag `span` `class='note'` ]]
//! ```
//!
//! `{{/* ... */}}` is a comment, and `{{-` / `-}}` trim adjacent whitespace.

use std::path::{Path, PathBuf};

use crate::error::{PublishError, Result};

/// Environment variable read by `build_info`.
pub const BUILD_INFO_ENV: &str = "WORDEPRESS_CI_INFO";

const DETAILS_STYLE: &str =
    "style='margin-left: 1em; border-left: 1px solid gray; padding-left: 1em;'";

/// Which expansion pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before markdown rendering, `{{ }}`.
    Markdown,
    /// After markdown rendering, `[[ ]]`.
    Html,
}

impl Stage {
    fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Stage::Markdown => ("{{", "}}"),
            Stage::Html => ("[[", "]]"),
        }
    }

    fn number(self) -> u8 {
        match self {
            Stage::Markdown => 1,
            Stage::Html => 2,
        }
    }
}

/// What template functions may see.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    source_dir: PathBuf,
    build_info: String,
}

impl TemplateContext {
    pub fn new(source_dir: impl Into<PathBuf>, build_info: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_info: build_info.into(),
        }
    }

    /// Context for a file in `source_dir`, with build info from the environment.
    pub fn from_env(source_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            source_dir,
            std::env::var(BUILD_INFO_ENV).unwrap_or_default(),
        )
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

/// Expand every action in `input`.
pub fn execute(stage: Stage, input: &str, ctx: &TemplateContext) -> Result<String> {
    let (open, close) = stage.delimiters();
    let fail = |message: String| PublishError::template(stage.number(), message);

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    let mut trim_next = false;

    while let Some(start) = rest.find(open) {
        let mut text = &rest[..start];
        if trim_next {
            text = text.trim_start();
        }
        let after_open = &rest[start + open.len()..];
        let end = after_open
            .find(close)
            .ok_or_else(|| fail(format!("unclosed action, expected {close}")))?;
        let mut action = &after_open[..end];
        rest = &after_open[end + close.len()..];

        if let Some(stripped) = action.strip_prefix("- ") {
            text = text.trim_end();
            action = stripped;
        }
        trim_next = false;
        if let Some(stripped) = action.strip_suffix(" -") {
            trim_next = true;
            action = stripped;
        }

        output.push_str(text);
        output.push_str(&run_action(action.trim(), ctx).map_err(fail)?);
    }

    output.push_str(if trim_next { rest.trim_start() } else { rest });
    Ok(output)
}

fn run_action(action: &str, ctx: &TemplateContext) -> std::result::Result<String, String> {
    if action.starts_with("/*") && action.ends_with("*/") && action.len() >= 4 {
        return Ok(String::new());
    }

    let mut words = tokenize(action)?.into_iter();
    let Some(Token::Ident(name)) = words.next() else {
        return Err(format!("expected a function name in action {action:?}"));
    };
    let args = words
        .map(|token| match token {
            Token::Literal(value) => Ok(value),
            Token::Ident(word) => Err(format!("unsupported argument {word:?} to {name}")),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(format!(
                "wrong number of args for {name}: want {expected} got {}",
                args.len()
            ))
        }
    };

    match name.as_str() {
        "open_tag" => match args.split_first() {
            Some((tag, attributes)) => Ok(open_tag(tag, attributes)),
            None => Err("wrong number of args for open_tag: want at least 1 got 0".into()),
        },
        "close_tag" => arity(1).map(|()| close_tag(&args[0])),
        "open_div" => Ok(open_tag("div", &args)),
        "close_div" => arity(0).map(|()| close_tag("div")),
        "open_details" => Ok(open_tag("details", &args)),
        "close_details" => arity(0).map(|()| close_tag("details")),
        "build_info" => arity(0).map(|()| ctx.build_info.clone()),
        "include" => {
            arity(1)?;
            let path = ctx.source_dir.join(&args[0]);
            std::fs::read_to_string(&path)
                .map_err(|e| format!("include {}: {e}", path.display()))
        }
        other => Err(format!("function {other:?} not defined")),
    }
}

fn open_tag(tag: &str, attributes: &[String]) -> String {
    if !attributes.is_empty() {
        return format!("<{tag} {}>", attributes.join(" "));
    }
    match default_attributes(tag) {
        Some(defaults) => format!("<{tag} {defaults}>"),
        None => format!("<{tag}>"),
    }
}

fn close_tag(tag: &str) -> String {
    format!("</{tag}>")
}

fn default_attributes(tag: &str) -> Option<&'static str> {
    match tag {
        "details" => Some(DETAILS_STYLE),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Literal(String),
}

fn tokenize(action: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = action.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '`' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('`') => break,
                    Some(ch) => value.push(ch),
                    None => return Err("unterminated raw quoted string".into()),
                }
            }
            tokens.push(Token::Literal(value));
        } else if c == '"' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(ch @ ('"' | '\\')) => value.push(ch),
                        Some(ch) => return Err(format!("unknown escape sequence \\{ch}")),
                        None => return Err("unterminated quoted string".into()),
                    },
                    Some(ch) => value.push(ch),
                    None => return Err("unterminated quoted string".into()),
                }
            }
            tokens.push(Token::Literal(value));
        } else {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '"' || ch == '`' {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Token::Ident(word));
        }
    }

    Ok(tokens)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext {
        TemplateContext::new(".", "build 42")
    }

    #[test]
    fn text_without_actions_is_unchanged() {
        let input = "plain [text] with {braces}\n";
        assert_eq!(execute(Stage::Markdown, input, &ctx()).unwrap(), input);
    }

    #[test]
    fn stages_use_their_own_delimiters() {
        let input = "{{ build_info }} [[ build_info ]]";
        assert_eq!(
            execute(Stage::Markdown, input, &ctx()).unwrap(),
            "build 42 [[ build_info ]]"
        );
        assert_eq!(
            execute(Stage::Html, input, &ctx()).unwrap(),
            "{{ build_info }} build 42"
        );
    }

    #[test]
    fn tag_helpers() {
        let out = execute(
            Stage::Html,
            "[[ open_tag `span` `class='a'` `id='b'` ]]x[[ close_tag `span` ]]",
            &ctx(),
        )
        .unwrap();
        assert_eq!(out, "<span class='a' id='b'>x</span>");

        let out = execute(Stage::Html, "[[open_div]][[close_div]]", &ctx()).unwrap();
        assert_eq!(out, "<div></div>");

        let out = execute(Stage::Markdown, r#"{{ open_details "open" }}"#, &ctx()).unwrap();
        assert_eq!(out, "<details open>");
    }

    #[test]
    fn details_has_default_style() {
        let out = execute(Stage::Html, "[[ open_details ]][[ close_details ]]", &ctx()).unwrap();
        assert_eq!(out, format!("<details {DETAILS_STYLE}></details>"));
    }

    #[test]
    fn comments_and_trim_markers() {
        let out = execute(Stage::Markdown, "a {{/* note */}}b", &ctx()).unwrap();
        assert_eq!(out, "a b");

        let out = execute(Stage::Markdown, "a   {{- build_info -}}   b", &ctx()).unwrap();
        assert_eq!(out, "abuild 42b");
    }

    #[test]
    fn include_reads_relative_to_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("snippets")).unwrap();
        std::fs::write(dir.path().join("snippets/x.md"), "included text").unwrap();

        let ctx = TemplateContext::new(dir.path(), "");
        let out = execute(Stage::Markdown, r#"> {{ include "snippets/x.md" }}"#, &ctx).unwrap();
        assert_eq!(out, "> included text");

        let err = execute(Stage::Markdown, r#"{{ include "missing.md" }}"#, &ctx).unwrap_err();
        assert!(err.to_string().starts_with("template stage 1: include"));
    }

    #[test]
    fn errors_name_the_stage() {
        let err = execute(Stage::Html, "[[ open_div", &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "template stage 2: unclosed action, expected ]]");

        let err = execute(Stage::Markdown, "{{ shout }}", &ctx()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "template stage 1: function \"shout\" not defined"
        );

        assert!(execute(Stage::Markdown, "{{ close_tag }}", &ctx()).is_err());
        assert!(execute(Stage::Markdown, "{{ close_div x }}", &ctx()).is_err());
        assert!(execute(Stage::Markdown, "{{ include \"a }}", &ctx()).is_err());
        assert!(execute(Stage::Markdown, "{{ }}", &ctx()).is_err());
    }
}
