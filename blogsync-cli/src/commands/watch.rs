//! Publish pages, then republish them as they change.

use super::publish::prepare;
use super::{PublishArgs, RemoteArgs};
use anyhow::{Context, Result};
use blogsync_core::page::is_page;
use blogsync_core::{PageLoader, PublishApi, Publisher, Session};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;

pub async fn watch(config_path: &Path, remote: &RemoteArgs, args: &PublishArgs) -> Result<()> {
    let (mut opts, loader) = prepare(config_path, args)?;
    // Events carry absolute paths, so pages must be keyed the same way.
    opts.content = std::fs::canonicalize(&opts.content)
        .with_context(|| format!("Failed to resolve {:?}", opts.content))?;
    let content_dir = opts.content.clone();

    let client = remote.client()?;
    let publisher = Publisher::new(client, opts, loader.config());
    let (mut session, report) = Session::start(publisher, &loader).await?;
    tracing::info!("initial publish complete: {}", report);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize watcher")?;
    watcher
        .watch(&content_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", content_dir))?;

    tracing::info!("watching {:?} for changes (Ctrl+C to stop)...", content_dir);
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(Ok(event)) => handle_event(&mut session, &loader, event).await,
                Some(Err(err)) => tracing::warn!("watcher error: {}", err),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

async fn handle_event<A: PublishApi>(session: &mut Session<A>, loader: &PageLoader, event: Event) {
    let removed = matches!(event.kind, EventKind::Remove(_));
    if !removed && !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }

    for path in event.paths.iter().filter(|p| is_page(p)) {
        // Renames report both names as modifications; the old one is gone.
        let report = if removed || !path.exists() {
            tracing::debug!("{} removed", path.display());
            session.remove_file(path).await
        } else {
            tracing::debug!("{} changed", path.display());
            session.publish_file(loader, path).await
        };
        tracing::info!("{}: {}", path.display(), report);
    }
}
