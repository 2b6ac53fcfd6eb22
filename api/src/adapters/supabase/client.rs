//! Auth REST API client implementation

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{AuthSession, AuthUser, SignUp, UserRole};
use crate::domain::ports::AuthProvider;
use crate::error::SupabaseError;

/// Implementation of the hosted auth API client
pub struct SupabaseAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseAuthClient {
    pub fn new(base_url: String, anon_key: String, service_role_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            service_role_key,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    /// Attach the project key every auth request needs
    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.anon_key)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| SupabaseError::Deserialization(e.to_string()))
        } else {
            Err(api_error(status.as_u16(), response).await)
        }
    }

    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), SupabaseError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status.as_u16(), response).await)
        }
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: &impl Serialize,
    ) -> Result<AuthSession, SupabaseError> {
        let response = self
            .with_api_key(self.http.post(self.auth_url("/token")))
            .query(&[("grant_type", grant_type)])
            .json(body)
            .send()
            .await?;

        let token: TokenResponse = self.handle_response(response).await?;
        token.try_into()
    }
}

/// Error body. Older deployments send `error`/`error_description`, newer
/// ones `error_code`/`msg`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn is_invalid_credentials(&self) -> bool {
        self.error.as_deref() == Some("invalid_grant")
            || self.error_code.as_deref() == Some("invalid_credentials")
    }

    fn message(self, fallback: String) -> String {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
            .unwrap_or(fallback)
    }
}

async fn api_error(status: u16, response: reqwest::Response) -> SupabaseError {
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

    if body.is_invalid_credentials() {
        return SupabaseError::InvalidCredentials;
    }

    SupabaseError::Api {
        status,
        message: body.message(text),
    }
}

/// Request types for the auth API
#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata,
}

#[derive(Serialize)]
struct SignUpMetadata {
    user_type: UserRole,
}

/// Response types from the auth API
#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
    email: Option<String>,
}

impl From<UserResponse> for AuthUser {
    fn from(r: UserResponse) -> Self {
        AuthUser {
            id: r.id,
            email: r.email.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: i64,
    user: Option<UserResponse>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TryFrom<TokenResponse> for AuthSession {
    type Error = SupabaseError;

    fn try_from(r: TokenResponse) -> Result<Self, Self::Error> {
        let user = r.user.ok_or_else(|| {
            SupabaseError::Deserialization("token response without user".to_string())
        })?;

        Ok(AuthSession {
            access_token: r.access_token,
            refresh_token: r.refresh_token,
            token_type: r.token_type,
            expires_in: r.expires_in,
            user: user.into(),
        })
    }
}

/// Sign-up answers with a session when sign-ins are allowed right away,
/// or with the bare user when the email still has to be confirmed.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        self.token_grant("password", &PasswordGrant { email, password })
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
            .map_err(|e| match e {
                // An unknown or revoked refresh token is a dead session
                SupabaseError::InvalidCredentials => SupabaseError::InvalidToken,
                e => e,
            })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<SignUp, SupabaseError> {
        let response = self
            .with_api_key(self.http.post(self.auth_url("/signup")))
            .json(&SignUpRequest {
                email,
                password,
                data: SignUpMetadata { user_type: role },
            })
            .send()
            .await?;

        match self.handle_response(response).await? {
            SignUpResponse::Session(token) => {
                let session: AuthSession = token.try_into()?;
                Ok(SignUp {
                    user: session.user.clone(),
                    session: Some(session),
                })
            }
            SignUpResponse::User(user) => Ok(SignUp {
                user: user.into(),
                session: None,
            }),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .with_api_key(self.http.post(self.auth_url("/logout")))
            .bearer_auth(access_token)
            .send()
            .await?;

        match self.handle_empty_response(response).await {
            // Already signed out
            Err(SupabaseError::Api { status: 401, .. })
            | Err(SupabaseError::Api { status: 404, .. }) => Ok(()),
            other => other,
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let response = self
            .with_api_key(self.http.get(self.auth_url("/user")))
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: UserResponse = self.handle_response(response).await.map_err(|e| match e {
            SupabaseError::Api {
                status: 401 | 403, ..
            } => SupabaseError::InvalidToken,
            e => e,
        })?;

        Ok(user.into())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), SupabaseError> {
        let service_key = self
            .service_role_key
            .as_deref()
            .ok_or(SupabaseError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))?;

        let response = self
            .http
            .delete(self.auth_url(&format!("/admin/users/{}", id)))
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
