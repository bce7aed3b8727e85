//! Single-document removal.

use axum::http::Method;

use crate::commands::CommandError;
use crate::config::SpaceConfig;
use crate::remote::{RemoteCall, RemoteClient};
use crate::routing::document_path;

/// Delete `bags/<bag>/tiddlers/<title>` on the origin.
pub async fn delete_document(
    client: &RemoteClient,
    config: &SpaceConfig,
    bag: &str,
    title: &str,
) -> Result<(), CommandError> {
    let uri = config.upstream_uri(&document_path(bag, title), None);
    let call = RemoteCall::new(Method::DELETE, uri)
        .credential(config.auth_token.as_deref())
        .timeout(config.remote_timeout());
    client.send(call).await?;
    tracing::info!(bag, title, "Deleted");
    Ok(())
}
