//! Rewrite handle passed to activation and deactivation taps.

use tracing::debug;
use wordepress_sdk::Rewrites;
use wordepress_sdk::types::{RewritePosition, RewriteRule};

use super::RewriteEngine;

/// Rules recorded during one lifecycle event.
pub struct RewriteBatch<'a> {
    engine: &'a RewriteEngine,
    pending: Vec<RewriteRule>,
    flushed: Option<Vec<RewriteRule>>,
}

impl<'a> RewriteBatch<'a> {
    pub(super) fn new(engine: &'a RewriteEngine) -> Self {
        Self {
            engine,
            pending: Vec::new(),
            flushed: None,
        }
    }

    /// Rules installed by the last flush of this batch, if any.
    pub fn flushed(&self) -> Option<&[RewriteRule]> {
        self.flushed.as_deref()
    }

    pub fn into_flushed(self) -> Option<Vec<RewriteRule>> {
        self.flushed
    }
}

impl Rewrites for RewriteBatch<'_> {
    fn add_rewrite_rule(&mut self, regex: &str, query: &str, position: RewritePosition) {
        debug!(regex, query, ?position, "rewrite rule added");
        self.pending.push(RewriteRule::new(regex, query, position));
    }

    fn flush_rewrite_rules(&mut self) {
        self.flushed = Some(self.engine.flush(&self.pending));
    }
}
