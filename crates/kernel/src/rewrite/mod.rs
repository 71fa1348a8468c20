//! Rewrite rule engine.
//!
//! Maps front-end paths such as `/docs/a/b/c` to internal queries
//! (`post_type=documentation&pagename=a-b-c`). The active rule set is
//! rebuilt only on an explicit flush and swapped in atomically, so
//! requests never observe a half-built set.

mod batch;
mod rules;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use wordepress_sdk::types::RewriteRule;

use crate::content::{PostService, PostTypeRegistry};
use crate::models::Post;

pub use batch::RewriteBatch;
pub use rules::{QueryVars, RewriteRules, assemble, generated_rule};
pub(crate) use rules::decode_component;

/// The active rewrite rule set.
#[derive(Clone)]
pub struct RewriteEngine {
    types: PostTypeRegistry,
    active: Arc<RwLock<Arc<RewriteRules>>>,
}

impl RewriteEngine {
    /// Start with the rules generated from the registered post types.
    pub fn new(types: PostTypeRegistry) -> Self {
        let initial = RewriteRules::compile(assemble(&[], &types.list()));
        Self {
            types,
            active: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Replace the active set with `rules` as given.
    pub fn install(&self, rules: Vec<RewriteRule>) {
        let compiled = Arc::new(RewriteRules::compile(rules));
        *self.active.write() = compiled;
    }

    /// Rebuild the active set from `extra` plus the generated post type rules.
    ///
    /// Returns the installed rules, in evaluation order.
    pub fn flush(&self, extra: &[RewriteRule]) -> Vec<RewriteRule> {
        let rules = assemble(extra, &self.types.list());
        self.install(rules.clone());
        info!(rules = rules.len(), extra = extra.len(), "rewrite rules flushed");
        rules
    }

    /// Snapshot of the active rules.
    pub fn rules(&self) -> Vec<RewriteRule> {
        self.snapshot().rules()
    }

    pub fn resolve(&self, path: &str) -> Option<QueryVars> {
        self.snapshot().resolve(path)
    }

    /// Start a batch for a single lifecycle event.
    pub fn batch(&self) -> RewriteBatch<'_> {
        RewriteBatch::new(self)
    }

    fn snapshot(&self) -> Arc<RewriteRules> {
        Arc::clone(&self.active.read())
    }
}

/// Find the published post an internal query points at.
///
/// `p` selects by id; otherwise `post_type` plus `pagename` walks the page
/// path, the last segment being the slug.
pub fn resolve_post(posts: &PostService, vars: &QueryVars) -> Option<Post> {
    let post_type = vars.post_type()?;
    if let Some(id) = vars.get("p").and_then(|p| p.parse::<u64>().ok()) {
        return posts
            .get(post_type, id)
            .ok()
            .filter(|post| post.status.is_public());
    }
    let path = vars.pagename().or_else(|| vars.get("name"))?;
    posts.find_published_by_path(post_type, path)
}
