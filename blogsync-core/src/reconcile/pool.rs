//! Remote posts awaiting a match during reconciliation.

use blogsync_types::RemotePost;

#[derive(Debug, Clone)]
struct Slot {
    post: RemotePost,
    consumed: bool,
}

/// Every remote post listed at the start of a run.
///
/// Each post can be claimed at most once. Whatever is left unclaimed once all
/// pages are processed has no local counterpart.
#[derive(Debug, Clone, Default)]
pub struct RemotePool {
    slots: Vec<Slot>,
}

impl RemotePool {
    pub fn new(posts: Vec<RemotePost>) -> Self {
        Self {
            slots: posts
                .into_iter()
                .map(|post| Slot {
                    post,
                    consumed: false,
                })
                .collect(),
        }
    }

    /// Claim the first unclaimed post with this slug in this collection.
    pub fn take(&mut self, slug: &str, collection: &str) -> Option<RemotePost> {
        let slot = self.slots.iter_mut().find(|s| {
            !s.consumed && s.post.slug == slug && s.post.collection_alias() == collection
        })?;
        slot.consumed = true;
        Some(slot.post.clone())
    }

    /// Claim a post by id, e.g. once it has been deleted.
    pub fn take_id(&mut self, id: &str) -> Option<RemotePost> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| !s.consumed && s.post.id == id)?;
        slot.consumed = true;
        Some(slot.post.clone())
    }

    /// Return a post to the pool so a later page can claim it.
    pub fn insert(&mut self, post: RemotePost) {
        self.slots.push(Slot {
            post,
            consumed: false,
        });
    }

    /// Posts nobody claimed, in listing order.
    pub fn remaining(&self) -> impl Iterator<Item = &RemotePost> {
        self.slots.iter().filter(|s| !s.consumed).map(|s| &s.post)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsync_types::PostCollection;

    fn post(id: &str, slug: &str, collection: Option<&str>) -> RemotePost {
        RemotePost {
            id: id.into(),
            slug: slug.into(),
            collection: collection.map(|alias| PostCollection {
                alias: alias.into(),
                title: String::new(),
            }),
            ..RemotePost::default()
        }
    }

    #[test]
    fn test_take_consumes_once() {
        let mut pool = RemotePool::new(vec![post("1", "hi", Some("blog"))]);
        assert_eq!(pool.take("hi", "blog").map(|p| p.id), Some("1".into()));
        assert!(pool.take("hi", "blog").is_none());
        assert_eq!(pool.remaining().count(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_match_needs_slug_and_collection() {
        let mut pool = RemotePool::new(vec![
            post("1", "hi", Some("blog")),
            post("2", "hi", None),
        ]);
        assert!(pool.take("hi", "notes").is_none());
        assert_eq!(pool.take("hi", "").map(|p| p.id), Some("2".into()));
        let left: Vec<_> = pool.remaining().map(|p| p.id.as_str()).collect();
        assert_eq!(left, vec!["1"]);
    }

    #[test]
    fn test_duplicates_match_in_listing_order() {
        let mut pool = RemotePool::new(vec![post("1", "hi", None), post("2", "hi", None)]);
        assert_eq!(pool.take("hi", "").map(|p| p.id), Some("1".into()));
        assert_eq!(pool.take("hi", "").map(|p| p.id), Some("2".into()));
        assert!(pool.take("hi", "").is_none());
    }

    #[test]
    fn test_take_id() {
        let mut pool = RemotePool::new(vec![post("1", "a", None), post("2", "b", None)]);
        assert!(pool.take_id("2").is_some());
        assert!(pool.take_id("2").is_none());
        assert!(pool.take("b", "").is_none());
        assert_eq!(pool.remaining().count(), 1);
    }

    #[test]
    fn test_inserted_post_can_be_claimed() {
        let mut pool = RemotePool::default();
        assert!(pool.is_empty());
        pool.insert(post("9", "moved", Some("blog")));
        assert_eq!(pool.take("moved", "blog").map(|p| p.id), Some("9".into()));
    }
}
