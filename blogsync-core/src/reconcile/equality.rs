//! Equality law used to decide whether a matched post needs an update.

use blogsync_types::{PostParams, RemotePost};

/// Whether two posts are equal for the purpose of updating them.
///
/// Only identifier, slug, font, language, direction, title and content are
/// compared. Timestamps and collection are ignored, so a date-only or
/// collection-only change never triggers an update on its own.
pub fn eq_post(p1: Option<&RemotePost>, p2: Option<&RemotePost>) -> bool {
    let (p1, p2) = match (p1, p2) {
        (None, None) => return true,
        (Some(p1), Some(p2)) => (p1, p2),
        _ => return false,
    };

    p1.id == p2.id
        && p1.slug == p2.slug
        && p1.font == p2.font
        && p1.language == p2.language
        && p1.rtl == p2.rtl
        && p1.title == p2.title
        && p1.content == p2.content
}

/// Compare a listed post against the parameters that would be sent for it.
pub fn eq_params(post: &RemotePost, params: &PostParams) -> bool {
    let candidate = RemotePost {
        id: params.id.clone(),
        slug: params.slug.clone(),
        token: params.token.clone(),
        font: params.font.clone(),
        language: params.language.clone(),
        rtl: params.is_rtl,
        created: params.created,
        updated: params.updated,
        title: params.title.clone(),
        content: params.content.clone(),
        // Fields this tool never writes pass through from the listing.
        listed: post.listed,
        views: post.views,
        tags: post.tags.clone(),
        images: post.images.clone(),
        owner_name: post.owner_name.clone(),
        collection: post.collection.clone(),
    };
    eq_post(Some(&candidate), Some(post))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsync_types::PostCollection;
    use chrono::DateTime;

    fn post() -> RemotePost {
        RemotePost {
            id: "abc".into(),
            slug: "hi".into(),
            token: "tok".into(),
            font: "norm".into(),
            language: Some("en".into()),
            rtl: Some(false),
            title: "Hi".into(),
            content: "hello world\n".into(),
            views: 12,
            collection: Some(PostCollection {
                alias: "blog".into(),
                title: "Blog".into(),
            }),
            ..RemotePost::default()
        }
    }

    fn params_for(post: &RemotePost) -> PostParams {
        PostParams {
            id: post.id.clone(),
            token: post.token.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            font: post.font.clone(),
            is_rtl: post.rtl,
            language: post.language.clone(),
            slug: post.slug.clone(),
            collection: post.collection_alias().to_string(),
            ..PostParams::default()
        }
    }

    #[test]
    fn test_reflexive() {
        let p = post();
        assert!(eq_post(Some(&p), Some(&p)));
        assert!(eq_post(None, None));
    }

    #[test]
    fn test_symmetric() {
        let a = post();
        let mut b = post();
        b.content = "changed\n".into();
        assert_eq!(eq_post(Some(&a), Some(&b)), eq_post(Some(&b), Some(&a)));
        assert_eq!(eq_post(Some(&a), None), eq_post(None, Some(&a)));
        assert!(!eq_post(Some(&a), None));
    }

    #[test]
    fn test_each_compared_field_matters() {
        let base = post();
        let changes: Vec<fn(&mut RemotePost)> = vec![
            |p| p.id = "other".into(),
            |p| p.slug = "other".into(),
            |p| p.font = "mono".into(),
            |p| p.language = None,
            |p| p.rtl = Some(true),
            |p| p.title = "Other".into(),
            |p| p.content = "other".into(),
        ];
        for change in changes {
            let mut changed = post();
            change(&mut changed);
            assert!(!eq_post(Some(&base), Some(&changed)), "{changed:?}");
        }
    }

    #[test]
    fn test_params_match_listing() {
        let p = post();
        assert!(eq_params(&p, &params_for(&p)));
    }

    #[test]
    fn test_timestamps_are_ignored() {
        let p = post();
        let mut params = params_for(&p);
        params.created = DateTime::parse_from_rfc3339("2001-01-01T00:00:00Z").ok();
        params.updated = DateTime::parse_from_rfc3339("2002-01-01T00:00:00Z").ok();
        assert!(eq_params(&p, &params));
    }

    // Known limitation: moving a page to another collection is not an update.
    #[test]
    fn test_collection_is_ignored() {
        let p = post();
        let mut params = params_for(&p);
        params.collection = "elsewhere".into();
        assert!(eq_params(&p, &params));
    }

    #[test]
    fn test_missing_language_on_listing_differs() {
        let mut p = post();
        let params = params_for(&p);
        p.language = None;
        assert!(!eq_params(&p, &params));
    }
}
