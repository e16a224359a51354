use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const JWKS_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("unknown signing key id")]
    UnknownKeyId,
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),
}

/// Verified identity extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Clone)]
pub enum AuthMode {
    /// Verify RS256 Firebase ID tokens against Google's published keys.
    Firebase { project_id: String },
    /// Accept any bearer token and derive a deterministic local identity
    /// from it. Only compiled in with the `dev-auth` feature.
    #[cfg(feature = "dev-auth")]
    Development,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<JwkKey>,
}

struct CachedJwks {
    keys: Vec<JwkKey>,
    fetched_at: Instant,
}

#[derive(Clone)]
pub struct AuthService {
    mode: AuthMode,
    client: reqwest::Client,
    jwks: Arc<RwLock<Option<CachedJwks>>>,
}

impl AuthService {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            client: reqwest::Client::new(),
            jwks: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        match &self.mode {
            AuthMode::Firebase { project_id } => self.verify_firebase(token, project_id).await,
            #[cfg(feature = "dev-auth")]
            AuthMode::Development => Ok(dev_identity(token)),
        }
    }

    async fn verify_firebase(&self, token: &str, project_id: &str) -> Result<AuthUser, AuthError> {
        let header =
            decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token header has no kid".into()))?;

        let key = match self.find_key(&kid, false).await? {
            Some(key) => key,
            // Key rotation: refetch once before giving up on the kid.
            None => self
                .find_key(&kid, true)
                .await?
                .ok_or(AuthError::UnknownKeyId)?,
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{project_id}")]);
        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(AuthUser {
            user_id: data.claims.sub,
            email: data.claims.email,
            name: data.claims.name,
            picture: data.claims.picture,
        })
    }

    async fn find_key(&self, kid: &str, force_refresh: bool) -> Result<Option<DecodingKey>, AuthError> {
        if !force_refresh {
            let cache = self.jwks.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.fetched_at.elapsed() < JWKS_TTL
            {
                return Ok(Self::key_from_set(&cached.keys, kid));
            }
        }
        let set: JwkSet = self
            .client
            .get(JWKS_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(keys = set.keys.len(), "refreshed signing key set");
        let key = Self::key_from_set(&set.keys, kid);
        let mut cache = self.jwks.write().await;
        *cache = Some(CachedJwks {
            keys: set.keys,
            fetched_at: Instant::now(),
        });
        Ok(key)
    }

    fn key_from_set(keys: &[JwkKey], kid: &str) -> Option<DecodingKey> {
        keys.iter()
            .find(|key| key.kid == kid)
            .and_then(|key| DecodingKey::from_rsa_components(&key.n, &key.e).ok())
    }
}

/// Deterministic identity for local development: the same token always maps
/// to the same user id, so data persists across restarts.
#[cfg(feature = "dev-auth")]
fn dev_identity(token: &str) -> AuthUser {
    let prefix: String = token
        .split('-')
        .next()
        .unwrap_or(token)
        .chars()
        .take(20)
        .collect();
    let user_id = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_DNS, format!("{prefix}.dev").as_bytes());
    AuthUser {
        user_id: user_id.to_string(),
        email: Some(format!("{prefix}@dev.local")),
        name: Some(prefix),
        picture: None,
    }
}
