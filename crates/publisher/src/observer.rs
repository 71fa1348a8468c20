//! Reporting sync decisions.
//!
//! The sync loop decides what to do with each post and image and tells an
//! observer before acting. A dry-run observer only logs and asks the loop not
//! to touch the site; the wet-run observer logs and optionally appends a
//! human-readable change report.

use std::io::Write;

use tracing::{info, warn};

use crate::image::Image;
use crate::post::{LocalPost, RemotePost};

pub trait PublishObserver {
    /// When true the sync loop reports decisions without performing them.
    fn dry_run(&self) -> bool;

    fn skipping_document(&mut self, local: &LocalPost);
    fn updating_document(&mut self, local: &LocalPost);
    fn uploading_document(&mut self, local: &LocalPost);
    fn deleting_document(&mut self, remote: &RemotePost);
    fn skipping_image(&mut self, image: &Image);
    fn uploading_image(&mut self, image: &Image);
}

#[derive(Debug, Default)]
pub struct DryRunObserver;

impl PublishObserver for DryRunObserver {
    fn dry_run(&self) -> bool {
        true
    }

    fn skipping_document(&mut self, local: &LocalPost) {
        info!(slug = %local.slug, "Would skip document");
    }

    fn updating_document(&mut self, local: &LocalPost) {
        info!(slug = %local.slug, "Would update document");
    }

    fn uploading_document(&mut self, local: &LocalPost) {
        info!(slug = %local.slug, "Would upload document");
    }

    fn deleting_document(&mut self, remote: &RemotePost) {
        info!(slug = %remote.slug, "Would delete document");
    }

    fn skipping_image(&mut self, image: &Image) {
        info!(image = %image.file_name(), "Would skip image");
    }

    fn uploading_image(&mut self, image: &Image) {
        info!(image = %image.file_name(), "Would upload image");
    }
}

/// Logs each action and appends `Added|Updated|Deleted {slug}` lines to the
/// report, if there is one.
pub struct WetRunObserver<W: Write> {
    report: Option<W>,
}

impl<W: Write> WetRunObserver<W> {
    pub fn new(report: Option<W>) -> Self {
        Self { report }
    }

    pub fn into_report(self) -> Option<W> {
        self.report
    }

    fn record(&mut self, verb: &str, slug: &str) {
        if let Some(report) = self.report.as_mut()
            && let Err(e) = writeln!(report, "{verb} {slug}")
        {
            warn!(error = %e, "failed to write report line");
        }
    }
}

impl<W: Write> PublishObserver for WetRunObserver<W> {
    fn dry_run(&self) -> bool {
        false
    }

    fn skipping_document(&mut self, local: &LocalPost) {
        info!(slug = %local.slug, "Skipping document");
    }

    fn updating_document(&mut self, local: &LocalPost) {
        info!(slug = %local.slug, "Updating document");
        self.record("Updated", &local.slug);
    }

    fn uploading_document(&mut self, local: &LocalPost) {
        info!(slug = %local.slug, "Uploading document");
        self.record("Added", &local.slug);
    }

    fn deleting_document(&mut self, remote: &RemotePost) {
        info!(slug = %remote.slug, "Deleting document");
        self.record("Deleted", &remote.slug);
    }

    fn skipping_image(&mut self, image: &Image) {
        info!(image = %image.file_name(), "Skipping image");
    }

    fn uploading_image(&mut self, image: &Image) {
        info!(image = %image.file_name(), "Uploading image");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn local(slug: &str) -> LocalPost {
        LocalPost {
            source: "x.md".into(),
            parent: None,
            title: "T".into(),
            content: String::new(),
            menu_order: 0,
            slug: slug.into(),
            product: "net".into(),
            version: "1".into(),
            name: "x".into(),
            tag: "latest".into(),
        }
    }

    #[test]
    fn wet_run_reports_changes_only() {
        let mut observer = WetRunObserver::new(Some(Vec::new()));
        assert!(!observer.dry_run());
        observer.uploading_document(&local("net-latest-a"));
        observer.skipping_document(&local("net-latest-b"));
        observer.updating_document(&local("net-latest-c"));
        observer.deleting_document(&RemotePost {
            slug: "net-latest-d".into(),
            ..RemotePost::default()
        });

        let report = String::from_utf8(observer.into_report().unwrap()).unwrap();
        assert_eq!(
            report,
            "Added net-latest-a\nUpdated net-latest-c\nDeleted net-latest-d\n"
        );
    }

    #[test]
    fn dry_run_never_performs() {
        assert!(DryRunObserver.dry_run());
    }
}
