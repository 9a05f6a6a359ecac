use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::main_lib::AppState;

pub const ROLE_AGENT: &str = "agent";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SERVICE: &str = "service";

/// A sales agent allowed to sign in.
#[derive(Clone, Debug)]
pub struct Agent {
    pub login: String,
    pub display_name: String,
    pub avatar: String,
    pub role: String,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Vec<u8>,
    pub access_token_ttl: Duration,
    pub agents: Vec<Agent>,
}

pub struct AuthManager {
    agents: HashMap<String, Agent>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    InvalidCredentials,
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    code: u16,
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub avatar: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub login: String,
    pub display_name: String,
    pub avatar: String,
    pub role: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub agent: AgentInfo,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let mut agents = HashMap::new();
        for agent in &config.agents {
            PasswordHash::new(&agent.password_hash)?;
            agents.insert(agent.login.to_lowercase(), agent.clone());
        }
        let encoding_key = EncodingKey::from_secret(&config.jwt_secret);
        let decoding_key = DecodingKey::from_secret(&config.jwt_secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Ok(Self {
            agents,
            encoding_key,
            decoding_key,
            validation,
            token_ttl: config.access_token_ttl,
        })
    }

    pub fn verify(&self, login: &str, candidate: &str) -> Result<&Agent, AuthError> {
        let agent = self
            .agents
            .get(&login.trim().to_lowercase())
            .ok_or(AuthError::InvalidCredentials)?;
        let parsed = PasswordHash::new(&agent.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash for agent: {e}")))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials,
                other => AuthError::Internal(format!("Password verification failed: {other}")),
            })?;
        Ok(agent)
    }

    pub fn issue_token(&self, agent: &Agent) -> Result<String, AuthError> {
        self.sign(&agent.login, &agent.display_name, &agent.avatar, &agent.role)
    }

    /// Token used by one service to call another.
    pub fn issue_service_token(&self, service_name: &str) -> Result<String, AuthError> {
        self.sign(service_name, service_name, "", ROLE_SERVICE)
    }

    fn sign(&self, sub: &str, name: &str, avatar: &str, role: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.token_ttl;
        let claims = Claims {
            sub: sub.to_string(),
            name: name.to_string(),
            avatar: avatar.to_string(),
            role: role.to_string(),
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::ImmatureSignature
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    AuthError::Unauthorized
                }
                other => AuthError::Internal(format!("Failed to validate token: {other:?}")),
            })
    }

    pub fn expires_in(&self) -> Duration {
        self.token_ttl
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid login or password".to_string(),
            ),
            AuthError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = Json(AuthErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

/// Decodes the configured secret, or generates one for this process.
pub fn resolve_secret_key(configured: Option<&str>) -> anyhow::Result<Vec<u8>> {
    match configured {
        Some(raw) => decode_secret_key(raw),
        None => {
            tracing::warn!("PH_JWT_SECRET not set, generating an ephemeral signing key");
            let mut secret = vec![0u8; 32];
            OsRng.fill_bytes(&mut secret);
            Ok(secret)
        }
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
}

/// The demo sales team. Everyone shares `password`.
pub fn demo_agents(password: &str) -> anyhow::Result<Vec<Agent>> {
    let password_hash = hash_password(password)?;
    let agent = |login: &str, display_name: &str, avatar: &str, role: &str| Agent {
        login: login.to_string(),
        display_name: display_name.to_string(),
        avatar: avatar.to_string(),
        role: role.to_string(),
        password_hash: password_hash.clone(),
    };
    Ok(vec![
        agent("jimmy.solid", "Jimmy Solid", "/static/avatars/jimmy.png", ROLE_AGENT),
        agent("danny.solid", "Danny Solid", "/static/avatars/danny.png", ROLE_AGENT),
        agent("agnes.smith", "Agnes Smith", "/static/avatars/agnes.png", ROLE_AGENT),
        agent("admin", "Administrator", "/static/avatars/admin.png", ROLE_ADMIN),
    ])
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let agent = state.auth.verify(&payload.login, &payload.password)?;
    let token = state.auth.issue_token(agent)?;
    tracing::info!("Agent {} signed in", agent.login);
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.expires_in().as_secs(),
        agent: AgentInfo {
            login: agent.login.clone(),
            display_name: agent.display_name.clone(),
            avatar: agent.avatar.clone(),
            role: agent.role.clone(),
        },
    }))
}

pub async fn me(Extension(claims): Extension<Claims>) -> Json<AgentInfo> {
    Json(AgentInfo {
        login: claims.sub,
        display_name: claims.name,
        avatar: claims.avatar,
        role: claims.role,
    })
}

pub async fn require_jwt(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let mut parts = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(AuthError::Unauthorized);
    };

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Unauthorized);
    }

    let claims = state.auth.validate_token(token)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: Duration) -> AuthManager {
        let agents = vec![Agent {
            login: "jimmy.solid".to_string(),
            display_name: "Jimmy Solid".to_string(),
            avatar: String::new(),
            role: ROLE_AGENT.to_string(),
            password_hash: hash_password("pa55").unwrap(),
        }];
        AuthManager::new(&AuthConfig {
            jwt_secret: vec![7u8; 32],
            access_token_ttl: ttl,
            agents,
        })
        .unwrap()
    }

    #[test]
    fn verify_accepts_case_insensitive_login() {
        let auth = manager(Duration::from_secs(60));
        assert_eq!(auth.verify("Jimmy.Solid", "pa55").unwrap().login, "jimmy.solid");
        assert!(matches!(
            auth.verify("jimmy.solid", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.verify("nobody", "pa55"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn issued_token_carries_agent_claims() {
        let auth = manager(Duration::from_secs(60));
        let agent = auth.verify("jimmy.solid", "pa55").unwrap().clone();
        let claims = auth
            .validate_token(&auth.issue_token(&agent).unwrap())
            .unwrap();
        assert_eq!(claims.sub, "jimmy.solid");
        assert_eq!(claims.name, "Jimmy Solid");
        assert_eq!(claims.role, ROLE_AGENT);

        let service = auth
            .validate_token(&auth.issue_service_token("policies").unwrap())
            .unwrap();
        assert_eq!(service.role, ROLE_SERVICE);
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let auth = manager(Duration::from_secs(60));
        let other = AuthManager::new(&AuthConfig {
            jwt_secret: vec![9u8; 32],
            access_token_ttl: Duration::from_secs(60),
            agents: Vec::new(),
        })
        .unwrap();
        let token = other.issue_service_token("intruder").unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn secret_key_must_be_32_bytes() {
        assert_eq!(
            decode_secret_key(&BASE64.encode([1u8; 32])).unwrap(),
            vec![1u8; 32]
        );
        assert!(decode_secret_key("").is_err());
        assert!(decode_secret_key(&BASE64.encode([1u8; 16])).is_err());
        assert_eq!(resolve_secret_key(None).unwrap().len(), 32);
    }
}
