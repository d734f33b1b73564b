use secrecy::SecretString;
use shared::{AuthResponse, LoginRequest, RegisterRequest};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::validate::Validate;

/// Logs in and authenticates the session with the returned credential.
pub async fn sign_in(api: &ApiClient, username: &str, password: SecretString) -> Result<AuthResponse> {
    let request = LoginRequest {
        username: username.trim().to_string(),
        password,
    };
    request.validate()?;

    let response = match api.login(&request).await {
        Err(Error::Unauthorized) => return Err(Error::WrongCredentials),
        result => result?,
    };
    api.session()
        .login(response.access_token.clone(), response.user_id)?;
    Ok(response)
}

/// Creates the account; the backend answers with a token, so the session
/// is authenticated right away.
pub async fn sign_up(
    api: &ApiClient,
    username: &str,
    email: &str,
    password: SecretString,
) -> Result<AuthResponse> {
    let request = RegisterRequest {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password,
    };
    request.validate()?;

    let response = api.register(&request).await?;
    info!(user_id = response.user_id, "Account created");
    api.session()
        .login(response.access_token.clone(), response.user_id)?;
    Ok(response)
}

/// The local session ends whatever the backend says.
pub async fn sign_out(api: &ApiClient) {
    if api.session().current_token().is_some() {
        if let Err(error) = api.logout().await {
            warn!(%error, "Backend logout failed, clearing local session anyway");
        }
    }
    api.session().logout();
}
