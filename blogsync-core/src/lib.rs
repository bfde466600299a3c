//! # blogsync-core
//!
//! Core library for syncing a directory of Markdown pages to a blog.
//!
//! This crate provides page loading and normalization, the reconciliation
//! engine that matches pages to remote posts, and the executor that applies
//! its decisions through a [`PublishApi`].

pub mod config;
pub mod convert;
pub mod frontmatter;
pub mod markdown;
pub mod metadata;
pub mod page;
pub mod reconcile;
pub mod remote;
pub mod slug;
pub mod sync;
pub mod template;

pub use config::{PublishOptions, SiteConfig};
pub use convert::{convert_dir, convert_page, ConvertReport};
pub use markdown::MarkdownNormalizer;
pub use metadata::{Metadata, Value};
pub use page::{walk_pages, Held, Loaded, Page, PageLoader, SkipReason};
pub use reconcile::{Action, Plan, Planner, RemotePool};
pub use remote::{ApiError, PublishApi};
pub use slug::slug;
pub use sync::{Publisher, Session, SyncError, SyncReport};
pub use template::BodyTemplate;
