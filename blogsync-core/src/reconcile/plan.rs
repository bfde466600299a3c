//! Decide what each page needs without touching the network.

use super::equality::eq_params;
use super::pool::RemotePool;
use crate::config::{PublishOptions, SiteConfig};
use crate::page::{Held, Page, SkipReason};
use blogsync_types::{PostParams, RemotePost, DEFAULT_FONT};
use std::collections::HashMap;
use std::path::PathBuf;

/// Which post an action applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    /// A post that already exists remotely
    Id(String),
    /// The post created by the same page's `Create` action
    Created,
}

/// One write (or deliberate non-write) against the remote service
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create(PostParams),
    Update {
        id: String,
        token: String,
        params: PostParams,
    },
    Skip {
        id: String,
        slug: String,
        reason: SkipReason,
    },
    Unpin {
        collection: String,
        post: PostRef,
    },
    Pin {
        collection: String,
        post: PostRef,
        position: i64,
    },
    Delete {
        id: String,
        token: String,
        slug: String,
    },
}

/// Decision for one eligible page
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub path: PathBuf,
    pub slug: String,
    pub collection: String,
    /// `Create`, `Update` or `Skip`
    pub write: Action,
    /// Matched remote post, if any
    pub existing: Option<RemotePost>,
    pub pin: Option<i64>,
}

impl PagePlan {
    pub fn post_ref(&self) -> PostRef {
        match &self.existing {
            Some(post) => PostRef::Id(post.id.clone()),
            None => PostRef::Created,
        }
    }

    /// Every action for this page, in execution order.
    ///
    /// Pin state cannot be read back, so the post is always unpinned first
    /// and pinned again only when the page asks for it.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = vec![
            self.write.clone(),
            Action::Unpin {
                collection: self.collection.clone(),
                post: self.post_ref(),
            },
        ];
        if let Some(position) = self.pin {
            actions.push(Action::Pin {
                collection: self.collection.clone(),
                post: self.post_ref(),
                position,
            });
        }
        actions
    }
}

/// Pages sharing a (slug, collection) key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSlug {
    pub slug: String,
    pub collection: String,
    pub paths: Vec<PathBuf>,
}

/// Full decision for a run
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub pages: Vec<PagePlan>,
    /// Remote posts no page claimed
    pub orphans: Vec<RemotePost>,
    /// Posts kept for pages that could not be rendered, by page path
    pub held: Vec<(PathBuf, RemotePost)>,
    pub duplicates: Vec<DuplicateSlug>,
    pub delete: bool,
}

impl Plan {
    /// Every action in the plan, pages first, then orphan deletions.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.pages.iter().flat_map(PagePlan::actions).collect();
        actions.extend(self.deletions());
        actions
    }

    /// `Delete` for every orphan, or nothing outside delete mode.
    pub fn deletions(&self) -> Vec<Action> {
        if !self.delete {
            return Vec::new();
        }
        self.orphans
            .iter()
            .map(|post| Action::Delete {
                id: post.id.clone(),
                token: post.token.clone(),
                slug: post.slug.clone(),
            })
            .collect()
    }
}

/// Builds post parameters for pages and classifies them against the remote
/// listing.
#[derive(Debug, Clone)]
pub struct Planner {
    force: bool,
    delete: bool,
    language: String,
    time_formats: Vec<String>,
}

impl Planner {
    pub fn new(opts: &PublishOptions, config: &SiteConfig) -> Self {
        Self {
            force: opts.force,
            delete: opts.delete,
            language: config.language.clone(),
            time_formats: opts.time_formats.clone(),
        }
    }

    /// Parameters that would be sent for `page` if it were created.
    pub fn params(&self, page: &Page) -> PostParams {
        let meta = &page.metadata;
        let created = meta
            .get_time_in("publishDate", &self.time_formats)
            .or_else(|| meta.get_time_in("date", &self.time_formats));
        let updated = meta
            .get_time_in("lastmod", &self.time_formats)
            .or(created);

        let language = match meta.get_string("lang") {
            "" => self.language.clone(),
            lang => lang.to_string(),
        };
        let font = match meta.get_string("font") {
            "" => DEFAULT_FONT.to_string(),
            font => font.to_string(),
        };

        PostParams {
            id: String::new(),
            token: String::new(),
            title: page.title.clone(),
            content: page.body.clone(),
            font,
            is_rtl: Some(meta.get_bool("rtl")),
            language: Some(language),
            slug: page.slug.clone(),
            created,
            updated,
            collection: page.collection.clone(),
        }
    }

    /// Classify one page against the post it matched, if any.
    pub fn plan_page(&self, page: &Page, existing: Option<RemotePost>) -> PagePlan {
        let mut params = self.params(page);

        let write = match &existing {
            None => {
                tracing::debug!("publishing {} from {}", page.slug, page.path.display());
                Action::Create(params)
            }
            Some(post) => {
                params.id = post.id.clone();
                params.token = post.token.clone();
                if !self.force && eq_params(post, &params) {
                    tracing::debug!("no updates needed for {}, skipping", page.slug);
                    Action::Skip {
                        id: post.id.clone(),
                        slug: page.slug.clone(),
                        reason: SkipReason::NoChanges,
                    }
                } else {
                    tracing::debug!(
                        "updating /{} ({:?}) from {}",
                        page.slug,
                        post.id,
                        page.path.display()
                    );
                    // Updates are rejected when they carry a creation date.
                    params.created = None;
                    Action::Update {
                        id: post.id.clone(),
                        token: post.token.clone(),
                        params,
                    }
                }
            }
        };

        PagePlan {
            path: page.path.clone(),
            slug: page.slug.clone(),
            collection: page.collection.clone(),
            write,
            existing,
            pin: page.metadata.get_int("pin"),
        }
    }

    /// Match every page against `pool` and classify it.
    ///
    /// Held pages claim their posts first and get no actions. Matched posts
    /// are consumed from the pool; whatever is left becomes the plan's
    /// orphans.
    pub fn plan(&self, pages: &[Page], held: &[Held], pool: &mut RemotePool) -> Plan {
        let mut seen: HashMap<(&str, &str), Vec<PathBuf>> = HashMap::new();
        let mut plans = Vec::with_capacity(pages.len());

        let mut kept = Vec::new();
        for page in held {
            if let Some(post) = pool.take(&page.slug, &page.collection) {
                tracing::debug!(
                    "keeping post {:?} for {} ({})",
                    post.slug,
                    page.path.display(),
                    page.reason
                );
                kept.push((page.path.clone(), post));
            }
        }

        for page in pages {
            if !page.is_eligible() {
                tracing::debug!("{} is not publishable, skipping", page.path.display());
                continue;
            }
            seen.entry((page.slug.as_str(), page.collection.as_str()))
                .or_default()
                .push(page.path.clone());

            let existing = pool.take(&page.slug, &page.collection);
            plans.push(self.plan_page(page, existing));
        }

        let mut duplicates: Vec<DuplicateSlug> = seen
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|((slug, collection), paths)| DuplicateSlug {
                slug: slug.to_string(),
                collection: collection.to_string(),
                paths,
            })
            .collect();
        duplicates.sort_by(|a, b| (&a.collection, &a.slug).cmp(&(&b.collection, &b.slug)));
        for dup in &duplicates {
            tracing::warn!(
                "slug {:?} is used by {} pages in collection {:?}: {:?}",
                dup.slug,
                dup.paths.len(),
                dup.collection,
                dup.paths
            );
        }

        Plan {
            pages: plans,
            orphans: pool.remaining().cloned().collect(),
            held: kept,
            duplicates,
            delete: self.delete,
        }
    }
}
