//! List query parameters for the posts REST controller.
//!
//! Top-level parameters (`page`, `per_page`, `slug`, …) are always accepted.
//! `filter[...]` parameters are query vars and are honoured only when their
//! name is in the allow-list produced by the `tap_rest_query_vars` filter.

use std::collections::{BTreeMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::models::{Post, PostStatus};

/// Query vars every list request may use through `filter[...]`.
pub const DEFAULT_QUERY_VARS: &[&str] = &[
    "p",
    "name",
    "pagename",
    "s",
    "post_parent",
    "orderby",
    "order",
    "posts_per_page",
];

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

/// Response context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Context {
    #[default]
    View,
    /// Adds raw values and requires authentication.
    Edit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    Date,
    Id,
    Title,
    Slug,
    MenuOrder,
}

impl OrderBy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "date" => Some(OrderBy::Date),
            "id" | "ID" => Some(OrderBy::Id),
            "title" => Some(OrderBy::Title),
            "slug" | "name" => Some(OrderBy::Slug),
            "menu_order" => Some(OrderBy::MenuOrder),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Order::Asc),
            "desc" => Some(Order::Desc),
            _ => None,
        }
    }
}

/// Comparison operator of a meta query clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetaCompare {
    #[default]
    Eq,
    NotEq,
    Like,
    Exists,
}

impl MetaCompare {
    /// Unknown operators fall back to equality.
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "!=" => MetaCompare::NotEq,
            "LIKE" => MetaCompare::Like,
            "EXISTS" => MetaCompare::Exists,
            _ => MetaCompare::Eq,
        }
    }
}

/// One `meta_query` clause. All clauses of a query must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaClause {
    pub key: String,
    pub value: Option<String>,
    pub compare: MetaCompare,
}

impl MetaClause {
    pub fn matches(&self, meta: &BTreeMap<String, String>) -> bool {
        let current = meta.get(&self.key);
        match (self.compare, &self.value) {
            (MetaCompare::Exists, _) | (MetaCompare::Eq, None) => current.is_some(),
            (MetaCompare::Eq, Some(v)) => current == Some(v),
            (MetaCompare::NotEq, Some(v)) => current.is_some_and(|c| c != v),
            (MetaCompare::NotEq, None) => current.is_some(),
            (MetaCompare::Like, Some(v)) => {
                current.is_some_and(|c| c.to_lowercase().contains(&v.to_lowercase()))
            }
            (MetaCompare::Like, None) => current.is_some(),
        }
    }
}

/// Which statuses a list request returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Only(PostStatus),
    /// Every status except trash.
    Any,
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(PostStatus::Publish)
    }
}

impl StatusFilter {
    pub fn matches(&self, status: PostStatus) -> bool {
        match self {
            StatusFilter::Only(s) => *s == status,
            StatusFilter::Any => status != PostStatus::Trash,
        }
    }
}

/// Parsed list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub page: usize,
    pub per_page: usize,
    pub context: Context,
    pub status: StatusFilter,
    pub slug: Option<String>,
    pub parent: Option<u64>,
    pub search: Option<String>,
    pub id: Option<u64>,
    /// Hierarchical page path, `parent-slug/child-slug`.
    pub pagename: Option<String>,
    pub meta_query: Vec<MetaClause>,
    pub orderby: OrderBy,
    pub order: Order,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            context: Context::View,
            status: StatusFilter::default(),
            slug: None,
            parent: None,
            search: None,
            id: None,
            pagename: None,
            meta_query: Vec::new(),
            orderby: OrderBy::default(),
            order: Order::default(),
        }
    }
}

#[derive(Default)]
struct PartialClause {
    key: Option<String>,
    value: Option<String>,
    compare: Option<String>,
}

impl PostQuery {
    /// Parse decoded query-string pairs.
    ///
    /// `allowed` is the set of query vars permitted inside `filter[...]`;
    /// anything else there is dropped silently.
    pub fn from_pairs(pairs: &[(String, String)], allowed: &HashSet<String>) -> AppResult<Self> {
        let mut query = PostQuery::default();
        let mut clauses: BTreeMap<(u64, String), PartialClause> = BTreeMap::new();

        for (key, value) in pairs {
            let segments = bracket_segments(key);
            let Some((head, rest)) = segments.split_first() else {
                continue;
            };

            if *head == "filter" {
                let Some((var, sub)) = rest.split_first() else {
                    continue;
                };
                if !allowed.contains(*var) {
                    tracing::debug!(var = %var, "dropping filter on query var outside allow-list");
                    continue;
                }
                query.apply_filter(var, sub, value, &mut clauses);
                continue;
            }

            if !rest.is_empty() {
                continue;
            }

            match *head {
                "page" => {
                    query.page = value
                        .parse()
                        .ok()
                        .filter(|p| *p >= 1)
                        .ok_or_else(|| AppError::invalid_param("Invalid parameter(s): page"))?;
                }
                "per_page" => {
                    query.per_page = value
                        .parse()
                        .ok()
                        .filter(|p| (1..=MAX_PER_PAGE).contains(p))
                        .ok_or_else(|| AppError::invalid_param("Invalid parameter(s): per_page"))?;
                }
                "context" => {
                    query.context = match value.as_str() {
                        "view" | "embed" => Context::View,
                        "edit" => Context::Edit,
                        _ => return Err(AppError::invalid_param("Invalid parameter(s): context")),
                    };
                }
                "status" => {
                    query.status = if value == "any" {
                        StatusFilter::Any
                    } else {
                        StatusFilter::Only(value.parse().map_err(|_| {
                            AppError::invalid_param("Invalid parameter(s): status")
                        })?)
                    };
                }
                "slug" => query.slug = Some(value.clone()),
                "parent" => {
                    query.parent = Some(value.parse().map_err(|_| {
                        AppError::invalid_param("Invalid parameter(s): parent")
                    })?);
                }
                "search" => query.search = Some(value.clone()).filter(|s| !s.is_empty()),
                "orderby" => {
                    query.orderby = OrderBy::parse(value)
                        .ok_or_else(|| AppError::invalid_param("Invalid parameter(s): orderby"))?;
                }
                "order" => {
                    query.order = Order::parse(value)
                        .ok_or_else(|| AppError::invalid_param("Invalid parameter(s): order"))?;
                }
                _ => {}
            }
        }

        query.meta_query = clauses
            .into_values()
            .filter_map(|c| {
                Some(MetaClause {
                    key: c.key?,
                    value: c.value,
                    compare: c.compare.as_deref().map(MetaCompare::parse).unwrap_or_default(),
                })
            })
            .collect();

        Ok(query)
    }

    fn apply_filter(
        &mut self,
        var: &str,
        sub: &[&str],
        value: &str,
        clauses: &mut BTreeMap<(u64, String), PartialClause>,
    ) {
        match (var, sub) {
            ("meta_query", [index, field]) => {
                // Numeric indices sort numerically, anything else after them
                let order = index.parse::<u64>().unwrap_or(u64::MAX);
                let clause = clauses.entry((order, (*index).to_string())).or_default();
                match *field {
                    "key" => clause.key = Some(value.to_string()),
                    "value" => clause.value = Some(value.to_string()),
                    "compare" => clause.compare = Some(value.to_string()),
                    _ => {}
                }
            }
            ("name", []) => self.slug = Some(value.to_string()),
            ("pagename", []) => self.pagename = Some(value.trim().to_string()),
            ("p", []) => self.id = value.parse().ok(),
            ("s", []) => self.search = Some(value.to_string()).filter(|s| !s.is_empty()),
            ("post_parent", []) => self.parent = value.parse().ok(),
            ("orderby", []) => {
                if let Some(o) = OrderBy::parse(value) {
                    self.orderby = o;
                }
            }
            ("order", []) => {
                if let Some(o) = Order::parse(value) {
                    self.order = o;
                }
            }
            ("posts_per_page", []) => {
                if let Ok(n) = value.parse::<i64>() {
                    self.per_page = if n <= 0 {
                        MAX_PER_PAGE
                    } else {
                        usize::try_from(n).unwrap_or(MAX_PER_PAGE).min(MAX_PER_PAGE)
                    };
                }
            }
            _ => {}
        }
    }

    /// Whether answering this query needs an authenticated caller.
    pub fn requires_auth(&self) -> bool {
        self.context == Context::Edit || self.status != StatusFilter::default()
    }

    /// Match every criterion except `pagename`, which needs the parent chain.
    pub fn matches(&self, post: &Post) -> bool {
        if !self.status.matches(post.status) {
            return false;
        }
        if self.id.is_some_and(|id| id != post.id) {
            return false;
        }
        if self.slug.as_ref().is_some_and(|s| !s.split(',').any(|s| s.trim() == post.slug)) {
            return false;
        }
        if self.parent.is_some_and(|p| p != post.parent) {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        self.meta_query.iter().all(|c| c.matches(&post.meta))
    }

    /// Sort posts in place according to `orderby`/`order`. Ties break on id.
    pub fn sort(&self, posts: &mut [Post]) {
        posts.sort_by(|a, b| {
            let primary = match self.orderby {
                OrderBy::Date => a.created.cmp(&b.created),
                OrderBy::Id => a.id.cmp(&b.id),
                OrderBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                OrderBy::Slug => a.slug.cmp(&b.slug),
                OrderBy::MenuOrder => a.menu_order.cmp(&b.menu_order),
            }
            .then(a.id.cmp(&b.id));
            match self.order {
                Order::Asc => primary,
                Order::Desc => primary.reverse(),
            }
        });
    }
}

/// Split `filter[meta_query][0][key]` into `["filter", "meta_query", "0", "key"]`.
fn bracket_segments(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            break;
        };
        segments.push(&stripped[..close]);
        rest = &stripped[close + 1..];
    }
    segments
}
