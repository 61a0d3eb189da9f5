//! HTTP client for the hosted identity provider's REST API.

use super::{
    Claims, ClaimsRefresh, ErrorCode, IdentityProvider, OtpKind, ProviderError, Session,
    SessionTokens, SessionUpdate, SignIn, SignUp, SignUpRequest, User,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};
use url::form_urlencoded;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

pub struct GoTrueProvider {
    base_url: String,
    api_key: SecretString,
    client: Client,
}

impl std::fmt::Debug for GoTrueProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

impl GoTrueProvider {
    /// Build a client for the provider at `base_url` (e.g. `https://xyz.example.co`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.base_url)
    }

    /// Every call carries the publishable key; user calls swap the bearer for
    /// the user's access token.
    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .request(method, self.endpoint(path))
            .header("apikey", key)
            .bearer_auth(bearer.unwrap_or(key))
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let response = self
            .request(Method::POST, "/token?grant_type=refresh_token", None)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        decode(response).await
    }
}

#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Signup answers with a full session when the project auto-confirms, and
/// with the bare user otherwise.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum SignUpBody {
    Session(Session),
    User(User),
}

async fn api_error(status: StatusCode, response: Response) -> ProviderError {
    let body: ErrorBody = response.json().await.unwrap_or_default();
    let code = body.error_code.as_deref().and_then(ErrorCode::parse);
    let message = body
        .msg
        .or(body.message)
        .or(body.error_description)
        .or(body.error)
        .unwrap_or_else(|| status.to_string());

    ProviderError::api(status.as_u16(), code, message)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|err| ProviderError::Decode(err.to_string()))
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignIn, ProviderError> {
        let response = self
            .request(Method::POST, "/token?grant_type=password", None)
            .json(&json!({ "email": email, "password": password.expose_secret() }))
            .send()
            .await?;

        let session: Session = decode(response).await?;

        Ok(SignIn {
            user: Some(session.user.clone()),
            session: Some(session),
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUp, ProviderError> {
        let redirect_to: String = form_urlencoded::byte_serialize(request.redirect_to.as_bytes())
            .collect();

        let response = self
            .request(
                Method::POST,
                &format!("/signup?redirect_to={redirect_to}"),
                None,
            )
            .json(&json!({
                "email": request.email,
                "password": request.password.expose_secret(),
                "data": request.metadata,
            }))
            .send()
            .await?;

        match decode::<SignUpBody>(response).await? {
            SignUpBody::Session(session) => Ok(SignUp {
                user: Some(session.user.clone()),
                session: Some(session),
            }),
            SignUpBody::User(user) => Ok(SignUp {
                user: Some(user),
                session: None,
            }),
        }
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, tokens: &SessionTokens) -> Result<(), ProviderError> {
        let Some(access_token) = tokens.access_token.as_deref() else {
            return Ok(());
        };

        let response = self
            .request(Method::POST, "/logout?scope=local", Some(access_token))
            .send()
            .await?;

        let status = response.status();
        // An already-expired or revoked session is as signed out as it gets.
        if status.is_success()
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::NOT_FOUND
        {
            return Ok(());
        }

        Err(api_error(status, response).await)
    }

    #[instrument(skip_all)]
    async fn get_claims(&self, tokens: &SessionTokens) -> Result<ClaimsRefresh, ProviderError> {
        if let Some(access_token) = tokens.access_token.as_deref() {
            let response = self
                .request(Method::GET, "/user", Some(access_token))
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let user: User = decode(response).await?;
                return Ok(ClaimsRefresh {
                    claims: Some(Claims::from(&user)),
                    session: SessionUpdate::Unchanged,
                });
            }

            if status != StatusCode::UNAUTHORIZED && status != StatusCode::FORBIDDEN {
                return Err(api_error(status, response).await);
            }

            debug!("access token rejected ({status}), trying refresh token");
        }

        let Some(refresh_token) = tokens.refresh_token.as_deref() else {
            let session = if tokens.access_token.is_some() {
                SessionUpdate::Cleared
            } else {
                SessionUpdate::Unchanged
            };
            return Ok(ClaimsRefresh {
                claims: None,
                session,
            });
        };

        match self.refresh(refresh_token).await {
            Ok(session) => Ok(ClaimsRefresh {
                claims: Some(Claims::from(&session.user)),
                session: SessionUpdate::Refreshed(session),
            }),
            Err(err) if err.is_rejection() => {
                debug!("refresh token rejected: {err}");
                Ok(ClaimsRefresh {
                    claims: None,
                    session: SessionUpdate::Cleared,
                })
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, token_hash))]
    async fn verify_otp(&self, token_hash: &str, kind: OtpKind) -> Result<Session, ProviderError> {
        let response = self
            .request(Method::POST, "/verify", None)
            .json(&json!({ "type": kind.as_str(), "token_hash": token_hash }))
            .send()
            .await?;

        decode(response).await
    }
}
