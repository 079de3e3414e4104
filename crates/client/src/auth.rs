//! Authentication calls. The only code that writes the [`Session`] token.
//!
//! [`Session`]: crate::session::Session

use serde::{Deserialize, Serialize};
use websurvey_core::types::{DbId, Timestamp};

use crate::error::GatewayError;
use crate::http::ApiClient;

/// The logged-in user as returned by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

/// Body of `POST /sign-up`.
#[derive(Debug, Clone, Serialize)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    remember: bool,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: User,
    token: String,
}

/// Login, sign-up, logout and current-user calls.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and store the issued token in the session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<User, GatewayError> {
        let response = self
            .client
            .post("/login")
            .json(&Credentials {
                email,
                password,
                remember,
            })
            .send()
            .await?;
        let auth: AuthResponse = ApiClient::parse_response(response).await?;
        self.client.session().set(auth.token);
        tracing::info!(user_id = auth.user.id, "Logged in");
        Ok(auth.user)
    }

    /// Register, then hold the new account's token.
    pub async fn sign_up(&self, input: &SignUp) -> Result<User, GatewayError> {
        let response = self.client.post("/sign-up").json(input).send().await?;
        let auth: AuthResponse = ApiClient::parse_response(response).await?;
        self.client.session().set(auth.token);
        tracing::info!(user_id = auth.user.id, "Signed up");
        Ok(auth.user)
    }

    /// Revoke the token server-side and forget it.
    ///
    /// The local token is dropped even when the server call fails.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let result = match self.client.post("/logout").send().await {
            Ok(response) => ApiClient::check_status(response).await,
            Err(e) => Err(e.into()),
        };
        self.client.session().clear();
        result
    }

    pub async fn me(&self) -> Result<User, GatewayError> {
        let response = self.client.get("/me").send().await?;
        ApiClient::parse_response(response).await
    }
}
