//! Bringing the site in line with a loaded source tree.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::api::Client;
use crate::error::Result;
use crate::observer::PublishObserver;
use crate::post::RemotePost;
use crate::site::Site;
use crate::target::Target;

/// Counts of what a run did, or would have done.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub images_uploaded: usize,
    pub images_skipped: usize,
}

/// Publish `site` to `target`.
///
/// Images go first so rendered content never points at a missing upload.
/// Posts follow in parent-first order: unchanged posts are skipped, changed
/// ones updated in place, new ones created. Owned remote posts with no local
/// counterpart are deleted last.
pub async fn create_or_update_posts(
    client: &Client,
    target: &Target,
    site: &Site,
    observer: &mut dyn PublishObserver,
) -> Result<SyncSummary> {
    let dry_run = observer.dry_run();
    let rest_base = target.rest_base();
    let mut summary = SyncSummary::default();

    let mut remaining = owned_posts(client, target).await?;

    for image in &site.images {
        if client.media_exists(image).await? {
            observer.skipping_image(image);
            summary.images_skipped += 1;
        } else {
            observer.uploading_image(image);
            if !dry_run {
                client.upload_media(image).await?;
            }
            summary.images_uploaded += 1;
        }
    }

    // Remote id of each local post; unknown for posts a dry run would create.
    let mut ids: Vec<Option<u64>> = Vec::with_capacity(site.posts.len());

    for local in &site.posts {
        let parent_id = match local.parent {
            None => Some(0),
            Some(index) => ids.get(index).copied().flatten(),
        };
        let body = local.to_json(parent_id.unwrap_or(0));

        let id = match remaining.remove(&local.slug) {
            Some(remote)
                if parent_id.is_some_and(|parent| target.is_current(local, &remote, parent)) =>
            {
                observer.skipping_document(local);
                summary.skipped += 1;
                Some(remote.id)
            }
            Some(remote) => {
                observer.updating_document(local);
                if !dry_run {
                    client.update_post(rest_base, remote.id, &body).await?;
                }
                summary.updated += 1;
                Some(remote.id)
            }
            None => {
                observer.uploading_document(local);
                summary.added += 1;
                if dry_run {
                    None
                } else {
                    Some(client.create_post(rest_base, &body).await?.id)
                }
            }
        };
        ids.push(id);
    }

    for remote in remaining.values() {
        observer.deleting_document(remote);
        if !dry_run {
            client.delete_post(rest_base, remote.id).await?;
        }
        summary.deleted += 1;
    }

    info!(
        added = summary.added,
        updated = summary.updated,
        skipped = summary.skipped,
        deleted = summary.deleted,
        images_uploaded = summary.images_uploaded,
        dry_run,
        "Publish complete"
    );
    Ok(summary)
}

/// Delete every post owned by `target`.
pub async fn delete_posts(
    client: &Client,
    target: &Target,
    observer: &mut dyn PublishObserver,
) -> Result<SyncSummary> {
    let dry_run = observer.dry_run();
    let mut summary = SyncSummary::default();

    for remote in client
        .list_posts(target.rest_base(), &target.list_query())
        .await?
    {
        if !target.owns(&remote) {
            // meta_query was ignored, most likely by an outdated plugin
            warn!(
                slug = %remote.slug,
                "Skipping delete due to product/tag mismatch. Is your plugin up to date?"
            );
            continue;
        }

        observer.deleting_document(&remote);
        if !dry_run {
            client.delete_post(target.rest_base(), remote.id).await?;
        }
        summary.deleted += 1;
    }

    info!(deleted = summary.deleted, dry_run, "Delete complete");
    Ok(summary)
}

/// Remote posts belonging to `target`, keyed by slug.
async fn owned_posts(client: &Client, target: &Target) -> Result<BTreeMap<String, RemotePost>> {
    let mut owned = BTreeMap::new();
    for remote in client
        .list_posts(target.rest_base(), &target.list_query())
        .await?
    {
        if target.owns(&remote) {
            owned.insert(remote.slug.clone(), remote);
        } else {
            debug!(slug = %remote.slug, "ignoring post owned by another target");
        }
    }
    Ok(owned)
}
