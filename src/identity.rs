// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credentials and session tokens.
//!
//! Passwords are stored as Argon2 PHC strings. Sessions are HS256 JWTs signed
//! with the configured secret; access and refresh tokens share the format and
//! are told apart by the `typ` claim.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ledger;
use crate::models::{NewUser, User};

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// Hashes with Argon2id defaults and a fresh 16-byte salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Corrupt(format!("password salt: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Corrupt(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// `Ok(false)` for a wrong password; an unreadable stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| Error::Corrupt(format!("stored password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(Error::Corrupt(format!("password verification failed: {}", e))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    typ: String,
    exp: u64,
}

/// Issues and checks session tokens.
pub trait IdentityProvider {
    fn issue(&self, user_id: Uuid) -> Result<TokenPair>;

    /// The user id an access token was issued for.
    fn verify_access(&self, token: &str) -> Result<Uuid>;

    /// Exchanges a valid refresh token for a fresh pair.
    fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}

pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtIssuer {
    pub fn new(config: &Config) -> Self {
        let secret = config.token_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    fn sign(&self, user_id: Uuid, typ: &str, ttl: Duration) -> Result<String> {
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .and_then(|t| u64::try_from(t.timestamp()).ok())
            .ok_or_else(|| Error::validation("Token lifetime is out of range"))?;
        let claims = Claims {
            sub: user_id,
            typ: typ.to_string(),
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Authentication(format!("Failed to sign token: {}", e)))
    }

    fn decode(&self, token: &str, expected_typ: &str) -> Result<Uuid> {
        let invalid = || Error::Authentication(format!("Invalid {} token", expected_typ));
        let data = decode::<Claims>(token.trim(), &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::Authentication("Token has expired".into()),
                _ => invalid(),
            },
        )?;
        if data.claims.typ != expected_typ {
            return Err(invalid());
        }
        Ok(data.claims.sub)
    }
}

impl IdentityProvider for JwtIssuer {
    fn issue(&self, user_id: Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign(user_id, ACCESS, self.access_ttl)?,
            refresh_token: self.sign(user_id, REFRESH, self.refresh_ttl)?,
            token_type: "bearer".into(),
        })
    }

    fn verify_access(&self, token: &str) -> Result<Uuid> {
        self.decode(token, ACCESS)
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let user_id = self.decode(refresh_token, REFRESH)?;
        self.issue(user_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

pub fn register(conn: &Connection, idp: &dyn IdentityProvider, new: &NewUser) -> Result<AuthSession> {
    let user = ledger::users::register(conn, new)?;
    Ok(AuthSession {
        tokens: idp.issue(user.id)?,
        user,
    })
}

pub fn login(
    conn: &Connection,
    idp: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<AuthSession> {
    let user = ledger::users::authenticate(conn, email, password)?;
    tracing::info!(user_id = %user.id, "login");
    Ok(AuthSession {
        tokens: idp.issue(user.id)?,
        user,
    })
}

/// Refreshes a session, refusing tokens whose user no longer exists.
pub fn refresh(conn: &Connection, idp: &dyn IdentityProvider, refresh_token: &str) -> Result<TokenPair> {
    let pair = idp.refresh(refresh_token)?;
    let user_id = idp.verify_access(&pair.access_token)?;
    match ledger::users::get(conn, user_id) {
        Ok(_) => Ok(pair),
        Err(e) if e.is_not_found() => Err(Error::Authentication("User not found".into())),
        Err(e) => Err(e),
    }
}

/// Resolves the acting user from an access token.
pub fn current_user(conn: &Connection, idp: &dyn IdentityProvider, access_token: &str) -> Result<User> {
    let user_id = idp.verify_access(access_token)?;
    match ledger::users::get(conn, user_id) {
        Ok(u) => Ok(u),
        Err(e) if e.is_not_found() => Err(Error::Authentication("User not found".into())),
        Err(e) => Err(e),
    }
}
