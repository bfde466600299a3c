//! Shared types for blogsync
//!
//! This crate provides the wire types exchanged with the remote publishing
//! service: posts as they are listed, the parameters used to create or update
//! them, and collections.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Default post font when a page does not choose one.
pub const DEFAULT_FONT: &str = "norm";

/// Collection summary embedded in a listed post
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostCollection {
    pub alias: String,

    #[serde(default)]
    pub title: String,
}

/// Snapshot of a post on the remote service at listing time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: String,

    #[serde(default)]
    pub slug: String,

    /// Revocation token; required to update or delete anonymous posts
    #[serde(default)]
    pub token: String,

    #[serde(default, rename = "appearance")]
    pub font: String,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub rtl: Option<bool>,

    #[serde(default)]
    pub listed: bool,

    #[serde(default)]
    pub created: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub updated: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "body")]
    pub content: String,

    // Read-only fields below are never written back.
    #[serde(default)]
    pub views: i64,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default, rename = "owner", skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<PostCollection>,
}

impl RemotePost {
    /// Alias of the collection this post belongs to, or "" for anonymous posts.
    pub fn collection_alias(&self) -> &str {
        self.collection
            .as_ref()
            .map(|c| c.alias.as_str())
            .unwrap_or("")
    }
}

/// Parameters sent when creating or updating a post
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostParams {
    /// Post identifier; travels in the URL, never in the body
    #[serde(skip)]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(rename = "body")]
    pub content: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub font: String,

    #[serde(default, rename = "rtl", skip_serializing_if = "Option::is_none")]
    pub is_rtl: Option<bool>,

    #[serde(default, rename = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    pub slug: String,

    /// Absent rather than zero when the page declares no creation date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<FixedOffset>>,

    /// Target collection alias; selects the endpoint, never serialized
    #[serde(skip)]
    pub collection: String,
}

/// A collection (blog) owned by the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collection {
    pub alias: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub views: i64,

    #[serde(default)]
    pub public: bool,
}

/// Parameters used to create a collection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionParams {
    pub alias: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}
