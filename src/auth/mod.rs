//! Identity operations: registration, sign-in, token refresh, and the
//! current-user lookup. Passwords are argon2-hashed; sessions are HS256
//! bearer tokens carrying the user id, email, and role.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::StoreError;
use crate::models::{Profile, Role};
use crate::store::{ProfileStore, StoreResult};

/// Wire shape of the signed-in user, merged from the user row and profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AuthUser,
    /// Unix seconds at which the token expires.
    pub expires_at: i64,
}

/// Bearer token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(pool: SqlitePool, jwt_secret: String, token_ttl_minutes: i64) -> Self {
        Self {
            pool,
            jwt_secret,
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> StoreResult<AuthUser> {
        request.validate().map_err(StoreError::from_validation)?;

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StoreError::Conflict(format!(
                "an account already exists for {}",
                request.email
            )));
        }

        let id = Uuid::new_v4();
        let role = request.role.unwrap_or_default();
        let password_hash = hash_password(&request.password)?;
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, full_name, role, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&request.email)
        .bind(password_hash)
        .bind(&request.full_name)
        .bind(role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(user_id = %id, "user registered");
        Ok(AuthUser {
            id,
            email: request.email,
            full_name: request.full_name,
            role,
            phone: request.phone,
            department: request.department,
        })
    }

    /// Verify credentials and mint a bearer token. The profile is created
    /// with the default role the first time this identity signs in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> StoreResult<AuthResponse> {
        request.validate().map_err(StoreError::from_validation)?;

        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            warn!("sign-in rejected: unknown email");
            return Err(StoreError::Unauthorized);
        };
        let user = row_to_user(&row)?;

        if !verify_password(&request.password, &user.password_hash) {
            warn!(user_id = %user.id, "sign-in rejected: bad password");
            return Err(StoreError::Unauthorized);
        }

        let profile = ProfileStore::new(self.pool.clone())
            .ensure(user.id, &user.email, Some(&user.full_name))
            .await?;

        self.respond_with_token(user, profile)
    }

    /// Decode and validate a bearer token. Any failure, including expiry,
    /// reads as Unauthorized.
    pub fn verify(&self, token: &str) -> StoreResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| StoreError::Unauthorized)
    }

    /// Issue a fresh token for an already-authenticated user.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn refresh(&self, user_id: Uuid) -> StoreResult<AuthResponse> {
        let user = self.user_by_id(user_id).await?;
        let profile = ProfileStore::new(self.pool.clone())
            .ensure(user.id, &user.email, Some(&user.full_name))
            .await?;
        self.respond_with_token(user, profile)
    }

    pub async fn current_user(&self, user_id: Uuid) -> StoreResult<AuthUser> {
        let user = self.user_by_id(user_id).await?;
        let profile = ProfileStore::new(self.pool.clone())
            .ensure(user.id, &user.email, Some(&user.full_name))
            .await?;
        Ok(merge(user, profile))
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<UserRecord> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::Unauthorized)?;
        row_to_user(&row)
    }

    fn respond_with_token(&self, user: UserRecord, profile: Profile) -> StoreResult<AuthResponse> {
        let expires_at = (Utc::now() + self.token_ttl).timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: profile.role,
            exp: expires_at,
        };
        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| StoreError::Internal(format!("token encoding failed: {e}")))?;

        Ok(AuthResponse {
            access_token,
            user: merge(user, profile),
            expires_at,
        })
    }
}

struct UserRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
}

fn merge(user: UserRecord, profile: Profile) -> AuthUser {
    AuthUser {
        id: user.id,
        email: user.email,
        full_name: profile.full_name.unwrap_or(user.full_name),
        role: profile.role,
        phone: profile.phone,
        department: profile.department,
    }
}

fn row_to_user(row: &SqliteRow) -> StoreResult<UserRecord> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        full_name: row.try_get("full_name")?,
    })
}

fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }
}
