//! List the authenticated user's collections.

use super::RemoteArgs;
use anyhow::{Context, Result};
use blogsync_core::PublishApi;

pub async fn list_collections(remote: &RemoteArgs) -> Result<()> {
    let client = remote.client()?;
    let collections = client
        .list_collections()
        .await
        .context("Failed to list collections")?;

    for collection in collections {
        println!("{}\t{}", collection.alias, collection.title);
    }
    Ok(())
}
