//! Publishing local app files as documents.
//!
//! # Responsibilities
//! - Collect top-level `*.html` files and every file in `assets/`
//! - Derive a document title from each file name
//! - PUT each file into the target bag, optionally deleting it first
//!
//! # Design Decisions
//! - A failed item is reported and the rest still go out
//! - Files with no known content type are skipped, never guessed as binary

use axum::http::Method;
use bytes::Bytes;
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::CommandError;
use crate::config::SpaceConfig;
use crate::remote::{OutboundBody, RemoteCall, RemoteClient};
use crate::routing::{content_type, document_path, ASSETS_DIR};

/// Suffix appended to a bare space name to address its public bag.
pub const PUBLIC_SUFFIX: &str = "_public";

/// A bag name as given, or the space's public bag when it has no `_`.
pub fn target_bag(name: &str) -> String {
    if name.contains('_') {
        name.to_string()
    } else {
        format!("{name}{PUBLIC_SUFFIX}")
    }
}

/// Title for a local file: the file name without `.html` or `.tid`.
pub fn document_title(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let title = name
        .strip_suffix(".html")
        .or_else(|| name.strip_suffix(".tid"))
        .unwrap_or(name);
    Some(title.to_string())
}

/// One file to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushItem {
    pub source: PathBuf,
    pub title: String,
}

/// Top-level `*.html` files, then files in `assets/`, each group sorted.
pub fn collect_items(app_root: &Path) -> Result<Vec<PushItem>, CommandError> {
    let mut items = list_files(app_root, |p| p.extension().is_some_and(|e| e == "html"))?;
    let assets = app_root.join(ASSETS_DIR);
    if assets.is_dir() {
        items.extend(list_files(&assets, |_| true)?);
    }
    Ok(items)
}

fn list_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PushItem>, CommandError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(CommandError::io(dir))? {
        let path = entry.map_err(CommandError::io(dir))?.path();
        if path.is_file() && keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths
        .into_iter()
        .filter_map(|source| document_title(&source).map(|title| PushItem { source, title }))
        .collect())
}

/// What to push and how.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub bag: String,
    /// Push only the item whose title or file name matches.
    pub only: Option<String>,
    /// Delete each document before writing it.
    pub hard: bool,
}

/// Outcome of a push, by document title.
#[derive(Debug, Default)]
pub struct PushReport {
    pub pushed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl PushReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Publish the app under `app_root` into `options.bag`.
pub async fn push_assets(
    client: &RemoteClient,
    config: &SpaceConfig,
    app_root: &Path,
    options: &PushOptions,
) -> Result<PushReport, CommandError> {
    let bag = target_bag(&options.bag);
    let mut items = collect_items(app_root)?;
    if let Some(only) = options.only.as_deref() {
        items.retain(|item| {
            item.title == only || item.source.file_name().is_some_and(|n| n == only)
        });
        if items.is_empty() {
            return Err(CommandError::NothingToPush(only.to_string()));
        }
    }

    let mut report = PushReport::default();
    for item in items {
        let Some(mime) = content_type::guess(&item.source) else {
            tracing::warn!(file = %item.source.display(), "Unknown content type, skipping");
            report.skipped.push(item.title);
            continue;
        };
        let data = tokio::fs::read(&item.source)
            .await
            .map_err(CommandError::io(&item.source))?;

        let uri = config.upstream_uri(&document_path(&bag, &item.title), None);
        match push_one(client, config, &uri, &mime, Bytes::from(data), options.hard).await {
            Ok(()) => {
                tracing::info!(bag = %bag, title = %item.title, content_type = %mime, "Pushed");
                report.pushed.push(item.title);
            }
            Err(e) => {
                tracing::warn!(bag = %bag, title = %item.title, error = %e, "Push failed");
                report.failed.push((item.title, e.to_string()));
            }
        }
    }
    Ok(report)
}

async fn push_one(
    client: &RemoteClient,
    config: &SpaceConfig,
    uri: &str,
    mime: &str,
    data: Bytes,
    hard: bool,
) -> Result<(), CommandError> {
    if hard {
        let delete = RemoteCall::new(Method::DELETE, uri)
            .credential(config.auth_token.as_deref())
            .timeout(config.remote_timeout());
        match client.send(delete).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
    }

    let put = RemoteCall::new(Method::PUT, uri)
        .credential(config.auth_token.as_deref())
        .content_type(Some(mime))
        .timeout(config.remote_timeout())
        .body(OutboundBody::Content(data));
    client.send(put).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bag() {
        assert_eq!(target_bag("myspace"), "myspace_public");
        assert_eq!(target_bag("myspace_private"), "myspace_private");
        assert_eq!(target_bag("common_bag"), "common_bag");
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title(Path::new("app/index.html")).unwrap(), "index");
        assert_eq!(document_title(Path::new("app/assets/note.tid")).unwrap(), "note");
        assert_eq!(document_title(Path::new("app/assets/site.css")).unwrap(), "site.css");
        assert_eq!(document_title(Path::new("app/assets/jquery.min.js")).unwrap(), "jquery.min.js");
    }

    #[test]
    fn test_collect_items_order_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(ASSETS_DIR)).unwrap();
        fs::write(root.join("b.html"), "b").unwrap();
        fs::write(root.join("a.html"), "a").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join(ASSETS_DIR).join("z.js"), "z").unwrap();
        fs::write(root.join(ASSETS_DIR).join("app.css"), "c").unwrap();
        fs::create_dir(root.join(ASSETS_DIR).join("nested")).unwrap();

        let titles: Vec<_> = collect_items(root).unwrap().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["a", "b", "app.css", "z.js"]);
    }

    #[test]
    fn test_collect_without_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "i").unwrap();
        let items = collect_items(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "index");
    }
}
