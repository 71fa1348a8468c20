//! Loading a markdown source tree.
//!
//! Every `*.md` file in a directory becomes a post. A sibling directory with
//! the same stem (`setup.md` next to `setup/`) holds that post's children.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PublishError, Result};
use crate::image::Image;
use crate::parse::parse_front_matter;
use crate::post::LocalPost;
use crate::render::{markdown_to_html, rewrite_html};
use crate::slug::post_slug;
use crate::target::Target;
use crate::template::{self, Stage, TemplateContext};

/// Posts in parent-first order, plus every distinct image they reference.
#[derive(Debug, Default)]
pub struct Site {
    pub posts: Vec<LocalPost>,
    pub images: Vec<Image>,
}

impl Site {
    /// Load and render the tree rooted at `root` for `target`.
    pub fn load(target: &Target, root: &Path) -> Result<Self> {
        let mut site = Site::default();
        let mut seen_images = HashSet::new();
        site.load_dir(target, root, None, &mut seen_images)?;
        Ok(site)
    }

    fn load_dir(
        &mut self,
        target: &Target,
        dir: &Path,
        parent: Option<usize>,
        seen_images: &mut HashSet<String>,
    ) -> Result<()> {
        if !dir.is_dir() {
            return Err(PublishError::NotADirectory(dir.to_path_buf()));
        }

        let files = markdown_files(dir)?;
        info!(count = files.len(), dir = %dir.display(), "Loading markdown files");

        for file in files {
            let (post, images) =
                parse_file(target, &file, parent).map_err(|e| e.in_file(&file))?;
            debug!(slug = %post.slug, source = %file.display(), "parsed document");

            for image in images {
                if seen_images.insert(image.file_name()) {
                    self.images.push(image);
                }
            }

            let index = self.posts.len();
            self.posts.push(post);

            let children = file.with_extension("");
            if children.is_dir() {
                self.load_dir(target, &children, Some(index), seen_images)?;
            }
        }

        Ok(())
    }
}

/// Sorted `*.md` files directly inside `dir`.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PublishError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PublishError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run one file through the full pipeline.
pub fn parse_file(
    target: &Target,
    path: &Path,
    parent: Option<usize>,
) -> Result<(LocalPost, Vec<Image>)> {
    let source = std::fs::read_to_string(path).map_err(|e| PublishError::io(path, e))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let ctx = TemplateContext::from_env(dir);

    let (front, markdown) = parse_front_matter(&source)?;

    let expanded = template::execute(Stage::Markdown, &markdown, &ctx)?;
    let html = markdown_to_html(&expanded);
    let (html, images) = rewrite_html(target.product(), target.tag(), dir, &html)?;
    let content = template::execute(Stage::Html, &html, &ctx)?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug = post_slug(target.product(), target.tag(), &name)?;

    let post = LocalPost {
        source: path.to_path_buf(),
        parent,
        title: front.title,
        content,
        menu_order: front.menu_order,
        slug,
        product: target.product().to_string(),
        version: target.version().to_string(),
        name,
        tag: target.tag().to_string(),
    };
    Ok((post, images))
}
