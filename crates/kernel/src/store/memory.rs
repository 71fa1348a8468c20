use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::models::{Media, Post};
use crate::store::traits::PostStore;

/// An in-memory store backed by ordered maps.
///
/// Posts and attachments share one id sequence, as they do in WordPress.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    next_id: u64,
    posts: BTreeMap<u64, Post>,
    media: HashMap<String, Media>,
}

impl MemoryStoreInner {
    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored posts across every type.
    pub fn post_count(&self) -> usize {
        self.inner.read().posts.len()
    }
}

impl PostStore for MemoryStore {
    fn insert_post(&self, mut post: Post) -> Post {
        let mut inner = self.inner.write();
        post.id = inner.assign_id();
        inner.posts.insert(post.id, post.clone());
        post
    }

    fn get_post(&self, id: u64) -> Option<Post> {
        self.inner.read().posts.get(&id).cloned()
    }

    fn update_post(&self, post: Post) -> bool {
        let mut inner = self.inner.write();
        match inner.posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post;
                true
            }
            None => false,
        }
    }

    fn remove_post(&self, id: u64) -> Option<Post> {
        self.inner.write().posts.remove(&id)
    }

    fn posts_of_type(&self, post_type: &str) -> Vec<Post> {
        self.inner
            .read()
            .posts
            .values()
            .filter(|p| p.post_type == post_type)
            .cloned()
            .collect()
    }

    fn insert_media(&self, mut media: Media) -> Media {
        let mut inner = self.inner.write();
        media.id = inner.assign_id();
        inner.media.insert(media.file.clone(), media.clone());
        media
    }

    fn media_by_file(&self, file: &str) -> Option<Media> {
        self.inner.read().media.get(file).cloned()
    }

    fn media_count(&self) -> usize {
        self.inner.read().media.len()
    }
}
