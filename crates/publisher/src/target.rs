//! What a publish or delete run addresses on the site.

use crate::post::{LocalPost, RemotePost};

/// Product name every tutorial is published under.
pub const TUTORIALS_PRODUCT: &str = "tutorials";

/// Largest page size the site accepts.
pub const PAGE_SIZE: usize = 100;

/// A documentation release or a tutorials tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Documentation {
        product: String,
        version: String,
        tag: String,
    },
    Tutorials {
        tag: String,
    },
}

impl Target {
    pub fn documentation(
        product: impl Into<String>,
        version: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self::Documentation {
            product: product.into(),
            version: version.into(),
            tag: tag.into(),
        }
    }

    pub fn tutorials(tag: impl Into<String>) -> Self {
        Self::Tutorials { tag: tag.into() }
    }

    /// REST collection the posts live in.
    pub fn rest_base(&self) -> &'static str {
        match self {
            Self::Documentation { .. } => "documentation",
            Self::Tutorials { .. } => "tutorials",
        }
    }

    pub fn product(&self) -> &str {
        match self {
            Self::Documentation { product, .. } => product,
            Self::Tutorials { .. } => TUTORIALS_PRODUCT,
        }
    }

    /// Tutorials are versioned by their tag.
    pub fn version(&self) -> &str {
        match self {
            Self::Documentation { version, .. } => version,
            Self::Tutorials { tag } => tag,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Documentation { tag, .. } | Self::Tutorials { tag } => tag,
        }
    }

    /// Query string for listing candidate posts, without `page`.
    ///
    /// Documentation is narrowed server-side with a `meta_query` filter on
    /// product and tag. Tutorials carry no tag field, so all are listed and
    /// ownership is decided by [`Target::owns`].
    pub fn list_query(&self) -> String {
        let base = format!("context=edit&per_page={PAGE_SIZE}");
        match self {
            Self::Documentation { product, tag, .. } => format!(
                "{base}\
                 &filter[meta_query][0][key]=wpcf-product\
                 &filter[meta_query][0][value]={}\
                 &filter[meta_query][1][key]=wpcf-tag\
                 &filter[meta_query][1][value]={}",
                urlencoding::encode(product),
                urlencoding::encode(tag),
            ),
            Self::Tutorials { .. } => base,
        }
    }

    /// Whether a listed post belongs to this target.
    ///
    /// Servers that ignore `meta_query` return unrelated posts; those must
    /// never be updated or deleted.
    pub fn owns(&self, remote: &RemotePost) -> bool {
        match self {
            Self::Documentation { product, tag, .. } => {
                remote.product == *product && remote.tag == *tag
            }
            Self::Tutorials { tag } => {
                let prefix = format!("{TUTORIALS_PRODUCT}-{}-", tag.replace('.', "-"));
                remote.slug.starts_with(&prefix)
            }
        }
    }

    /// Whether the site already holds exactly what `local` would write.
    pub fn is_current(&self, local: &LocalPost, remote: &RemotePost, parent_id: u64) -> bool {
        let common = remote.title.raw == local.title
            && remote.content.raw == local.content
            && remote.menu_order == local.menu_order
            && remote.parent == parent_id
            && remote.name == local.name;
        match self {
            Self::Documentation { .. } => common && remote.version == local.version,
            Self::Tutorials { .. } => common,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn remote(slug: &str, product: &str, tag: &str) -> RemotePost {
        RemotePost {
            id: 1,
            slug: slug.into(),
            product: product.into(),
            tag: tag.into(),
            ..RemotePost::default()
        }
    }

    #[test]
    fn tutorials_use_tag_as_version() {
        let target = Target::tutorials("latest");
        assert_eq!(target.product(), "tutorials");
        assert_eq!(target.version(), "latest");
        assert_eq!(target.rest_base(), "tutorials");
        assert_eq!(target.list_query(), "context=edit&per_page=100");
    }

    #[test]
    fn documentation_query_filters_product_and_tag() {
        let query = Target::documentation("net", "1.0", "v 1").list_query();
        assert!(query.starts_with("context=edit&per_page=100&"));
        assert!(query.contains("filter[meta_query][0][value]=net&"));
        assert!(query.ends_with("filter[meta_query][1][value]=v%201"));
    }

    #[test]
    fn ownership() {
        let docs = Target::documentation("net", "", "latest");
        assert!(docs.owns(&remote("net-latest-a", "net", "latest")));
        assert!(!docs.owns(&remote("net-v1-a", "net", "v1")));
        assert!(!docs.owns(&remote("scope-latest-a", "scope", "latest")));

        let tutorials = Target::tutorials("1.2");
        assert!(tutorials.owns(&remote("tutorials-1-2-setup", "", "")));
        assert!(!tutorials.owns(&remote("tutorials-latest-setup", "", "")));
    }
}
