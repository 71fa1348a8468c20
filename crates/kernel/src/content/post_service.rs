//! Post service.
//!
//! CRUD over the post store for a single post type at a time. Handles slug
//! sanitisation and uniqueness, parent validation, trash semantics, REST field
//! accessors and hierarchical page-path lookup.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::query::PostQuery;
use super::rest_fields::RestFieldRegistry;
use super::slug::{sanitize_title, unique_slug};
use super::type_registry::PostTypeRegistry;
use crate::error::{AppError, AppResult};
use crate::models::{CreatePost, Post, PostStatus, UpdatePost};
use crate::store::PostStore;

/// Suffix given to the slug of a trashed post, freeing the original slug.
const TRASHED_SUFFIX: &str = "__trashed";

/// Ancestor walks stop here.
const MAX_PATH_DEPTH: usize = 64;

/// Service for post operations.
pub struct PostService {
    store: Arc<dyn PostStore>,
    types: PostTypeRegistry,
    fields: RestFieldRegistry,
    /// Serialises writes so slug uniqueness checks cannot race.
    write_lock: Mutex<()>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, types: PostTypeRegistry, fields: RestFieldRegistry) -> Self {
        Self {
            store,
            types,
            fields,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn PostStore> {
        &self.store
    }

    /// Load a post, requiring it to belong to `post_type`.
    pub fn get(&self, post_type: &str, id: u64) -> AppResult<Post> {
        self.store
            .get_post(id)
            .filter(|p| p.post_type == post_type)
            .ok_or_else(AppError::invalid_post_id)
    }

    /// Create a post, then pass every registered field present in `body` to
    /// its write accessor.
    pub fn create(&self, input: CreatePost, body: &Map<String, Value>) -> AppResult<Post> {
        let _guard = self.write_lock.lock();

        self.validate_parent(&input.post_type, input.parent, None)?;

        let requested = input.slug.as_deref().unwrap_or(&input.title);
        let base = sanitize_title(requested);
        let slug = if base.is_empty() {
            String::new()
        } else {
            self.unique_slug(&input.post_type, input.parent, &base, None)
        };

        let now = Utc::now();
        let mut post = self.store.insert_post(Post {
            id: 0,
            post_type: input.post_type,
            slug,
            title: input.title,
            content: input.content,
            status: input.status,
            parent: input.parent,
            menu_order: input.menu_order,
            created: now,
            modified: now,
            meta: Default::default(),
        });

        if post.slug.is_empty() {
            post.slug = post.id.to_string();
        }
        self.apply_fields(&mut post, body);
        self.store.update_post(post.clone());

        info!(
            post_type = %post.post_type,
            id = post.id,
            slug = %post.slug,
            "post created"
        );
        Ok(post)
    }

    /// Apply a partial update, then the registered fields present in `body`.
    pub fn update(
        &self,
        post_type: &str,
        id: u64,
        input: UpdatePost,
        body: &Map<String, Value>,
    ) -> AppResult<Post> {
        let _guard = self.write_lock.lock();
        let mut post = self.get(post_type, id)?;

        if let Some(parent) = input.parent {
            self.validate_parent(post_type, parent, Some(id))?;
            post.parent = parent;
        }
        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        if let Some(status) = input.status {
            post.status = status;
        }
        if let Some(menu_order) = input.menu_order {
            post.menu_order = menu_order;
        }
        if let Some(requested) = input.slug {
            let base = sanitize_title(&requested);
            if !base.is_empty() && base != post.slug {
                post.slug = self.unique_slug(post_type, post.parent, &base, Some(id));
            }
        }

        self.apply_fields(&mut post, body);
        post.modified = Utc::now();
        self.store.update_post(post.clone());

        debug!(post_type = %post_type, id, "post updated");
        Ok(post)
    }

    /// Move a post to the trash.
    pub fn trash(&self, post_type: &str, id: u64) -> AppResult<Post> {
        let _guard = self.write_lock.lock();
        let mut post = self.get(post_type, id)?;
        if post.status == PostStatus::Trash {
            return Err(AppError::Gone {
                code: "rest_already_trashed",
                message: "The post has already been deleted.".to_string(),
            });
        }

        post.status = PostStatus::Trash;
        post.slug = format!("{}{TRASHED_SUFFIX}", post.slug);
        post.modified = Utc::now();
        self.store.update_post(post.clone());

        info!(post_type = %post_type, id, "post trashed");
        Ok(post)
    }

    /// Delete a post permanently. Its children move up to its parent.
    pub fn delete(&self, post_type: &str, id: u64) -> AppResult<Post> {
        let _guard = self.write_lock.lock();
        let post = self.get(post_type, id)?;

        for mut child in self
            .store
            .posts_of_type(post_type)
            .into_iter()
            .filter(|p| p.parent == id)
        {
            child.parent = post.parent;
            self.store.update_post(child);
        }

        let removed = self.store.remove_post(id).ok_or_else(AppError::invalid_post_id)?;
        info!(post_type = %post_type, id, slug = %removed.slug, "post deleted");
        Ok(removed)
    }

    /// Run a list query. Returns one page of posts and the total match count.
    pub fn list(&self, post_type: &str, query: &PostQuery) -> (Vec<Post>, usize) {
        let all = self.store.posts_of_type(post_type);

        let path_target = query
            .pagename
            .as_deref()
            .map(|path| find_by_path(&all, path, |_| true).map(|p| p.id));

        let mut matched: Vec<Post> = all
            .iter()
            .filter(|p| query.matches(p))
            .filter(|p| match path_target {
                Some(target) => target == Some(p.id),
                None => true,
            })
            .cloned()
            .collect();

        query.sort(&mut matched);

        let total = matched.len();
        let start = query.page.saturating_sub(1).saturating_mul(query.per_page);
        let page = matched.into_iter().skip(start).take(query.per_page).collect();
        (page, total)
    }

    /// Resolve a published post by hierarchical page path (`parent/child`).
    pub fn find_published_by_path(&self, post_type: &str, path: &str) -> Option<Post> {
        let all = self.store.posts_of_type(post_type);
        find_by_path(&all, path, |p| p.status == PostStatus::Publish).cloned()
    }

    /// Page path of a post: its ancestors' slugs and its own, joined by `/`.
    pub fn page_path(&self, post: &Post) -> String {
        let mut segments = vec![post.slug.clone()];
        let mut parent = post.parent;
        while parent != 0 && segments.len() <= MAX_PATH_DEPTH {
            let Some(ancestor) = self.store.get_post(parent) else {
                break;
            };
            parent = ancestor.parent;
            segments.push(ancestor.slug);
        }
        segments.reverse();
        segments.join("/")
    }

    /// Values of every registered field of the post's type, via their read accessors.
    pub fn field_values(&self, post: &Post) -> Map<String, Value> {
        self.fields
            .fields_for(&post.post_type)
            .into_iter()
            .map(|field| {
                let value = field
                    .get_callback
                    .map(|get| get(post, &field.field_name))
                    .unwrap_or(Value::Null);
                (field.field_name, value)
            })
            .collect()
    }

    fn apply_fields(&self, post: &mut Post, body: &Map<String, Value>) {
        for field in self.fields.fields_for(&post.post_type) {
            let (Some(value), Some(update)) = (body.get(&field.field_name), field.update_callback)
            else {
                continue;
            };
            match update(value, post, &field.field_name) {
                Some(changed) => {
                    debug!(id = post.id, field = %field.field_name, changed, "field written");
                }
                None => {
                    debug!(id = post.id, field = %field.field_name, "field value rejected");
                }
            }
        }
    }

    fn validate_parent(&self, post_type: &str, parent: u64, child: Option<u64>) -> AppResult<()> {
        if parent == 0 {
            return Ok(());
        }
        if child == Some(parent) {
            return Err(AppError::invalid_param("Invalid parameter(s): parent"));
        }
        let hierarchical = self.types.get(post_type).is_some_and(|t| t.hierarchical);
        if !hierarchical {
            return Err(AppError::invalid_param("Invalid parameter(s): parent"));
        }

        // Walk up from the new parent; meeting the child would create a cycle
        let mut current = parent;
        while current != 0 {
            let Some(ancestor) = self
                .store
                .get_post(current)
                .filter(|p| p.post_type == post_type)
            else {
                return Err(AppError::bad_request(
                    "rest_post_invalid_parent",
                    "Invalid post parent ID.",
                ));
            };
            if child == Some(ancestor.parent) {
                return Err(AppError::invalid_param("Invalid parameter(s): parent"));
            }
            current = ancestor.parent;
        }
        Ok(())
    }

    /// Hierarchical types need unique slugs among siblings, flat types across the type.
    fn unique_slug(&self, post_type: &str, parent: u64, base: &str, exclude: Option<u64>) -> String {
        let hierarchical = self.types.get(post_type).is_some_and(|t| t.hierarchical);
        let posts = self.store.posts_of_type(post_type);
        unique_slug(base, |candidate| {
            posts.iter().any(|p| {
                Some(p.id) != exclude
                    && p.status != PostStatus::Trash
                    && (!hierarchical || p.parent == parent)
                    && p.slug == candidate
            })
        })
    }
}

/// Find the post whose slug is the last path segment and whose ancestor
/// chain matches the preceding segments exactly.
fn find_by_path<'a>(
    posts: &'a [Post],
    path: &str,
    visible: impl Fn(&Post) -> bool,
) -> Option<&'a Post> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let (leaf, ancestors) = segments.split_last()?;

    posts
        .iter()
        .filter(|p| p.slug == *leaf && visible(p))
        .find(|candidate| {
            let mut parent = candidate.parent;
            for expected in ancestors.iter().rev() {
                let Some(ancestor) = posts.iter().find(|p| p.id == parent) else {
                    return false;
                };
                if ancestor.slug != *expected {
                    return false;
                }
                parent = ancestor.parent;
            }
            parent == 0
        })
}
