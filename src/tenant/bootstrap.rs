// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Controller service account setup

use crate::config::Credentials;
use crate::error::{ControllerError, Result};
use crate::grafana::{EntityId, GrafanaClient};
use tracing::{info, instrument, warn};

/// Make sure the controller account exists, is server admin and uses the
/// configured password. Runs with the administrative client.
#[instrument(skip(admin, account), fields(login = %account.login))]
pub async fn ensure_controller_account(admin: &GrafanaClient, account: &Credentials) -> Result<EntityId> {
    // An existing account is fine, the lookup below finds it
    admin.create_user(&account.login, &account.password).await;

    let Some(user_id) = admin.user_id(&account.login).await else {
        return Err(ControllerError::BootstrapError(format!(
            "controller account {} could not be resolved",
            account.login
        )));
    };

    if !admin.grant_server_admin(user_id).await {
        return Err(ControllerError::BootstrapError(format!(
            "could not grant server admin to {}",
            account.login
        )));
    }
    if !admin.set_user_password(user_id, &account.password).await {
        warn!("Could not reset the controller account password");
    }

    info!(user_id, "Controller account ready");
    Ok(user_id)
}
