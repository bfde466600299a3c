//! Executing reconciliation plans against a publishing service.

use crate::config::{PublishOptions, SiteConfig};
use crate::page::{walk_pages, Held, Loaded, Page, PageLoader, SkipReason};
use crate::reconcile::{Action, PagePlan, Planner, PostRef, RemotePool};
use crate::remote::{ApiError, PublishApi};
use blogsync_types::{Collection, CollectionParams, PostCollection, PostParams, RemotePost};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("error retrieving posts: {0}")]
    List(#[source] ApiError),
}

/// What a run decided and did.
///
/// Counts are decisions, so a dry run reports the same numbers as a live one.
/// `writes` counts the write calls actually issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub orphaned: usize,
    pub failed: usize,
    pub writes: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} skipped, {} deleted, {} orphaned, {} failed",
            self.created,
            self.updated,
            self.unchanged,
            self.skipped,
            self.deleted,
            self.orphaned,
            self.failed
        )
    }
}

/// Publishes pages through a [`PublishApi`].
pub struct Publisher<A> {
    api: A,
    opts: PublishOptions,
    planner: Planner,
    site_title: String,
    site_description: String,
    /// Fetched on first use when collections may be created
    collections: Option<Vec<Collection>>,
}

impl<A: PublishApi> Publisher<A> {
    pub fn new(api: A, opts: PublishOptions, config: &SiteConfig) -> Self {
        Self {
            planner: Planner::new(&opts, config),
            api,
            opts,
            site_title: config.title.clone(),
            site_description: config.description.clone(),
            collections: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn options(&self) -> &PublishOptions {
        &self.opts
    }

    /// Publish every page under the content directory.
    pub async fn run(&mut self, loader: &PageLoader) -> Result<SyncReport, SyncError> {
        let mut pool = self.fetch_pool().await?;
        let mut known = HashMap::new();
        Ok(self.sync_all(loader, &mut pool, &mut known).await)
    }

    async fn fetch_pool(&self) -> Result<RemotePool, SyncError> {
        let posts = self.api.list_posts().await.map_err(SyncError::List)?;
        tracing::debug!("found {} remote posts", posts.len());
        Ok(RemotePool::new(posts))
    }

    async fn sync_all(
        &mut self,
        loader: &PageLoader,
        pool: &mut RemotePool,
        known: &mut HashMap<PathBuf, RemotePost>,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        if self.opts.create_collections && !self.opts.dry_run {
            let default = self.opts.collection.clone();
            self.ensure_collection(&default, &mut report).await;
        }

        let mut pages = Vec::new();
        let mut held = Vec::new();
        for path in walk_pages(&self.opts.content) {
            match load_page(loader, &path, &mut report) {
                Some(Local::Ready(page)) => pages.push(page),
                Some(Local::Held(page)) => held.push(page),
                None => {}
            }
        }

        let plan = self.planner.plan(&pages, &held, pool);
        for (path, post) in &plan.held {
            known.insert(path.clone(), post.clone());
        }
        for page_plan in &plan.pages {
            if let Some(post) = self.execute_page(page_plan, &mut report).await {
                known.insert(page_plan.path.clone(), post);
            }
        }

        if !plan.delete {
            for orphan in &plan.orphans {
                warn_orphan(orphan);
                report.orphaned += 1;
            }
        }
        for action in plan.deletions() {
            if let Action::Delete { id, token, slug } = &action {
                if self.delete(id, token, slug, &mut report).await {
                    pool.take_id(id);
                }
            }
        }

        report
    }

    /// Run a page's actions in order. Returns the post now backing the page,
    /// if there is one.
    ///
    /// A failed create or update abandons the rest of the page's actions.
    async fn execute_page(&mut self, plan: &PagePlan, report: &mut SyncReport) -> Option<RemotePost> {
        let mut post = plan.existing.clone();
        for action in plan.actions() {
            match &action {
                Action::Skip { .. } => report.unchanged += 1,
                Action::Create(params) => {
                    report.created += 1;
                    if self.opts.dry_run {
                        continue;
                    }
                    self.ensure_collection(&params.collection, report).await;
                    report.writes += 1;
                    match self.api.create_post(params).await {
                        Ok(created) => post = Some(remember(created, params)),
                        Err(err) => {
                            tracing::error!(
                                "error creating post from {}: {}",
                                plan.path.display(),
                                err
                            );
                            report.created -= 1;
                            report.failed += 1;
                            return None;
                        }
                    }
                }
                Action::Update { id, token, params } => {
                    report.updated += 1;
                    if self.opts.dry_run {
                        continue;
                    }
                    self.ensure_collection(&params.collection, report).await;
                    report.writes += 1;
                    match self.api.update_post(id, token, params).await {
                        Ok(updated) => post = Some(remember(updated, params)),
                        Err(err) => {
                            tracing::error!(
                                "error updating post {:?} from {}: {}",
                                id,
                                plan.path.display(),
                                err
                            );
                            report.updated -= 1;
                            report.failed += 1;
                            return plan.existing.clone();
                        }
                    }
                }
                Action::Unpin { collection, post: target } => {
                    tracing::debug!("attempting to unpin post {}…", plan.slug);
                    let Some(id) = self.target(target, post.as_ref()) else {
                        continue;
                    };
                    report.writes += 1;
                    if let Err(err) = self.api.unpin_post(collection, &id).await {
                        // Most posts are not pinned, so this usually fails.
                        tracing::debug!("error unpinning post {}: {}", plan.slug, err);
                    }
                }
                Action::Pin {
                    collection,
                    post: target,
                    position,
                } => {
                    tracing::debug!(
                        "attempting to pin post {} to position {}…",
                        plan.slug,
                        position
                    );
                    let Some(id) = self.target(target, post.as_ref()) else {
                        continue;
                    };
                    report.writes += 1;
                    if let Err(err) = self.api.pin_post(collection, &id, *position).await {
                        tracing::warn!(
                            "error pinning post {} to position {}: {}",
                            plan.slug,
                            position,
                            err
                        );
                    }
                }
                Action::Delete { id, token, slug } => {
                    if self.delete(id, token, slug, report).await {
                        post = None;
                    }
                }
            }
        }
        post
    }

    /// Id a pin action applies to, or `None` when nothing should be sent.
    fn target(&self, target: &PostRef, created: Option<&RemotePost>) -> Option<String> {
        if self.opts.dry_run {
            return None;
        }
        match target {
            PostRef::Id(id) => Some(id.clone()),
            PostRef::Created => created.map(|p| p.id.clone()),
        }
    }

    /// Delete a post that no longer has a page. Returns whether it is gone.
    async fn delete(&self, id: &str, token: &str, slug: &str, report: &mut SyncReport) -> bool {
        tracing::info!("no file found matching post {:?}, deleting", slug);
        report.deleted += 1;
        if self.opts.dry_run {
            return false;
        }
        report.writes += 1;
        match self.api.delete_post(id, token).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("error deleting post {:?}: {}", slug, err);
                report.deleted -= 1;
                report.failed += 1;
                false
            }
        }
    }

    /// Create `alias` unless it already exists. Failures are logged only.
    async fn ensure_collection(&mut self, alias: &str, report: &mut SyncReport) {
        if !self.opts.create_collections || alias.is_empty() {
            return;
        }

        if self.collections.is_none() {
            let collections = match self.api.list_collections().await {
                Ok(collections) => collections,
                Err(err) => {
                    tracing::warn!("error retrieving collections: {}", err);
                    Vec::new()
                }
            };
            self.collections = Some(collections);
        }
        let collections = self.collections.get_or_insert_with(Vec::new);
        if collections.iter().any(|c| c.alias == alias) {
            return;
        }

        let params = if alias == self.opts.collection && !self.site_title.is_empty() {
            CollectionParams {
                alias: alias.to_string(),
                title: self.site_title.clone(),
                description: self.site_description.clone(),
            }
        } else {
            CollectionParams {
                alias: alias.to_string(),
                title: alias.to_string(),
                description: String::new(),
            }
        };

        tracing::debug!("creating collection {}…", alias);
        report.writes += 1;
        match self.api.create_collection(&params).await {
            Ok(collection) => collections.push(collection),
            Err(err) => tracing::warn!("error creating collection {}: {}", alias, err),
        }
    }
}

/// A long-lived publishing session for watch mode.
///
/// The remote listing is fetched once. Afterwards single files are
/// republished or removed against the retained pool and the posts already
/// published from each path.
pub struct Session<A> {
    publisher: Publisher<A>,
    pool: RemotePool,
    known: HashMap<PathBuf, RemotePost>,
}

impl<A: PublishApi> Session<A> {
    /// List remote posts and publish every page once.
    pub async fn start(
        mut publisher: Publisher<A>,
        loader: &PageLoader,
    ) -> Result<(Self, SyncReport), SyncError> {
        let mut pool = publisher.fetch_pool().await?;
        let mut known = HashMap::new();
        let report = publisher.sync_all(loader, &mut pool, &mut known).await;
        Ok((
            Self {
                publisher,
                pool,
                known,
            },
            report,
        ))
    }

    pub fn publisher(&self) -> &Publisher<A> {
        &self.publisher
    }

    /// The post last published from `path`.
    pub fn known(&self, path: &Path) -> Option<&RemotePost> {
        self.known.get(path)
    }

    /// Republish one page after it changed on disk.
    pub async fn publish_file(&mut self, loader: &PageLoader, path: &Path) -> SyncReport {
        let mut report = SyncReport::default();
        let page = match load_page(loader, path, &mut report) {
            Some(Local::Ready(page)) => page,
            // Whatever was published from a held page stays known.
            Some(Local::Held(_)) | None => return report,
        };

        let existing = match self.known.remove(path) {
            Some(prev) if prev.slug == page.slug && prev.collection_alias() == page.collection => {
                Some(prev)
            }
            Some(prev) => {
                tracing::debug!(
                    "{} moved from {:?}, looking for a new match",
                    path.display(),
                    prev.slug
                );
                self.pool.insert(prev);
                self.pool.take(&page.slug, &page.collection)
            }
            None => self.pool.take(&page.slug, &page.collection),
        };

        let plan = self.publisher.planner.plan_page(&page, existing);
        if let Some(post) = self.publisher.execute_page(&plan, &mut report).await {
            self.known.insert(path.to_path_buf(), post);
        }
        report
    }

    /// Handle a page file that disappeared.
    pub async fn remove_file(&mut self, path: &Path) -> SyncReport {
        let mut report = SyncReport::default();
        let Some(post) = self.known.remove(path) else {
            tracing::debug!("{} was never published, nothing to remove", path.display());
            return report;
        };

        if !self.publisher.opts.delete {
            warn_orphan(&post);
            report.orphaned += 1;
            self.pool.insert(post);
            return report;
        }
        if !self
            .publisher
            .delete(&post.id, &post.token, &post.slug, &mut report)
            .await
        {
            self.pool.insert(post);
        }
        report
    }
}

enum Local {
    Ready(Page),
    Held(Held),
}

fn load_page(loader: &PageLoader, path: &Path, report: &mut SyncReport) -> Option<Local> {
    match loader.load(path) {
        Ok(Loaded::Ready(page)) => Some(Local::Ready(page)),
        Ok(Loaded::Skipped(reason)) => {
            report.skipped += 1;
            match reason {
                SkipReason::Draft => tracing::debug!("skipping draft {}", path.display()),
                reason => tracing::warn!("{}: {}, skipping", path.display(), reason),
            }
            None
        }
        Ok(Loaded::Held(held)) => {
            report.skipped += 1;
            tracing::warn!("{}: {}, skipping", path.display(), held.reason);
            Some(Local::Held(held))
        }
        Err(err) => {
            report.failed += 1;
            tracing::warn!("error loading {}, skipping: {}", path.display(), err);
            None
        }
    }
}

fn warn_orphan(post: &RemotePost) {
    tracing::warn!(
        "no file found matching post {:?}; it would be orphaned, re-run with --delete to remove",
        post.slug
    );
}

/// Snapshot of a post just written, filling in what the response omits.
fn remember(mut post: RemotePost, params: &PostParams) -> RemotePost {
    if post.token.is_empty() {
        post.token = params.token.clone();
    }
    if post.collection.is_none() && !params.collection.is_empty() {
        post.collection = Some(PostCollection {
            alias: params.collection.clone(),
            title: String::new(),
        });
    }
    post
}
