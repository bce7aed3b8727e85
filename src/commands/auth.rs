//! Interactive login.

use crate::auth::Authenticator;
use crate::commands::CommandError;
use crate::config::{ConfigPatch, ConfigStore};

/// Authenticate `user` and persist the resulting token in the local config.
pub async fn login(
    authenticator: &dyn Authenticator,
    store: &dyn ConfigStore,
    user: &str,
    password: &str,
) -> Result<(), CommandError> {
    let config = store.read()?;
    let token = authenticator.authenticate(&config, user, password).await?;
    store.write(&ConfigPatch::auth_token(token))?;
    tracing::info!(user, "Credential stored");
    Ok(())
}
