//! Account signup and login proxied to Supabase Auth.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Signup request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub user: AuthUser,
}

/// Supabase Auth REST proxy.
#[derive(Clone)]
pub struct AuthService {
    client: Client,
    url: Option<String>,
    anon_key: Option<String>,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Reject malformed email addresses before calling upstream.
pub fn validate_email(email: &str) -> Result<()> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(Error::Validation(format!("Invalid email address: {}", email)))
    }
}

/// First non-empty string among `keys` in an upstream error body.
fn upstream_message(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

fn parse_user(body: &Value) -> Option<AuthUser> {
    let user = body.get("user")?;
    if user.is_null() {
        return None;
    }
    serde_json::from_value(user.clone()).ok()
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<(String, &str)> {
        match (&self.url, &self.anon_key) {
            (Some(url), Some(key)) => Ok((format!("{}{}", url, path), key.as_str())),
            _ => Err(Error::NotConfigured("Supabase".to_string())),
        }
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<(StatusCode, Value)> {
        let (url, key) = self.endpoint(path)?;

        let response = self
            .client
            .post(&url)
            .header("apikey", key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            Value::Null
        } else {
            response.json().await.unwrap_or(Value::Null)
        };

        Ok((status, body))
    }

    /// Create an account.
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupResponse> {
        validate_email(&request.email)?;

        let full_name = request
            .full_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                request
                    .email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });

        let payload = json!({
            "email": request.email,
            "password": request.password,
            "data": { "full_name": full_name },
        });

        let (status, body) = self.post("/auth/v1/signup", &payload).await?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            if let Some(user) = parse_user(&body) {
                info!(user_id = %user.id, "Account created");
                return Ok(SignupResponse {
                    success: true,
                    message: "Account created successfully!".to_string(),
                    user,
                });
            }
        }

        let message = upstream_message(&body, &["msg", "message", "error_description"])
            .unwrap_or_else(|| "Signup failed".to_string());
        warn!(status = %status, error = %message, "Signup rejected");
        Err(Error::SignupRejected(message))
    }

    /// Exchange email and password for an access token.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        validate_email(&request.email)?;

        let payload = json!({
            "email": request.email,
            "password": request.password,
        });

        let (status, body) = self
            .post("/auth/v1/token?grant_type=password", &payload)
            .await?;

        if status == StatusCode::OK {
            let token = body
                .get("access_token")
                .and_then(Value::as_str)
                .map(str::to_string);
            return match (token, parse_user(&body)) {
                (Some(access_token), Some(user)) => Ok(LoginResponse {
                    success: true,
                    access_token,
                    user,
                }),
                _ => Err(Error::Upstream(
                    "Login response missing token or user".to_string(),
                )),
            };
        }

        let message = upstream_message(&body, &["error_description", "msg"])
            .unwrap_or_else(|| "Invalid credentials".to_string());
        Err(Error::InvalidCredentials(message))
    }
}
