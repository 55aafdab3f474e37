// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Duration;
use payfolio::config::Config;
use payfolio::identity::{self, IdentityProvider, JwtIssuer, hash_password, verify_password};
use payfolio::ledger::users;
use payfolio::models::NewUser;
use payfolio::{Error, db};
use uuid::Uuid;

fn issuer(secret: &str) -> JwtIssuer {
    JwtIssuer::new(&Config::in_memory(secret))
}

fn new_user(email: &str, password: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password: password.into(),
        full_name: Some("Test User".into()),
    }
}

fn is_auth_error(err: &Error) -> bool {
    matches!(err, Error::Authentication(_))
}

#[test]
fn passwords_are_salted() {
    let a = hash_password("hunter22").unwrap();
    let b = hash_password("hunter22").unwrap();
    assert_ne!(a, b);
    assert!(a.starts_with("$argon2id$"));
    assert!(verify_password("hunter22", &a).unwrap());
    assert!(verify_password("hunter22", &b).unwrap());
    assert!(!verify_password("hunter23", &a).unwrap());
}

#[test]
fn unreadable_stored_hash_is_an_error() {
    assert!(matches!(
        verify_password("hunter22", "no-separator").unwrap_err(),
        Error::Corrupt(_)
    ));
}

#[test]
fn tokens_are_three_part_jwts() {
    let idp = issuer("s3cret");
    let pair = idp.issue(Uuid::new_v4()).unwrap();
    assert_eq!(pair.access_token.split('.').count(), 3);
    assert_eq!(pair.refresh_token.split('.').count(), 3);
}

#[test]
fn access_token_resolves_to_its_user() {
    let idp = issuer("s3cret");
    let id = Uuid::new_v4();
    let pair = idp.issue(id).unwrap();
    assert_eq!(pair.token_type, "bearer");
    assert_eq!(idp.verify_access(&pair.access_token).unwrap(), id);
}

#[test]
fn token_kinds_are_not_interchangeable() {
    let idp = issuer("s3cret");
    let pair = idp.issue(Uuid::new_v4()).unwrap();
    assert!(is_auth_error(&idp.verify_access(&pair.refresh_token).unwrap_err()));
    assert!(is_auth_error(&idp.refresh(&pair.access_token).unwrap_err()));
}

#[test]
fn refresh_issues_a_pair_for_the_same_user() {
    let idp = issuer("s3cret");
    let id = Uuid::new_v4();
    let pair = idp.issue(id).unwrap();
    let next = idp.refresh(&pair.refresh_token).unwrap();
    assert_eq!(idp.verify_access(&next.access_token).unwrap(), id);
}

#[test]
fn tampered_and_foreign_tokens_are_rejected() {
    let idp = issuer("s3cret");
    let a = idp.issue(Uuid::new_v4()).unwrap().access_token;
    let b = idp.issue(Uuid::new_v4()).unwrap().access_token;
    let (b_body, _) = b.rsplit_once('.').unwrap();
    let (_, a_sig) = a.rsplit_once('.').unwrap();
    let forged = format!("{}.{}", b_body, a_sig);
    assert!(is_auth_error(&idp.verify_access(&forged).unwrap_err()));

    let other = issuer("different");
    assert!(is_auth_error(&other.verify_access(&a).unwrap_err()));

    assert!(is_auth_error(&idp.verify_access("garbage").unwrap_err()));
    assert!(is_auth_error(&idp.verify_access("").unwrap_err()));
}

#[test]
fn expired_token_is_rejected() {
    let mut config = Config::in_memory("s3cret");
    config.access_token_ttl = Duration::seconds(-1);
    let idp = JwtIssuer::new(&config);
    let pair = idp.issue(Uuid::new_v4()).unwrap();
    match idp.verify_access(&pair.access_token).unwrap_err() {
        Error::Authentication(msg) => assert_eq!(msg, "Token has expired"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn register_then_login() {
    let conn = db::open_in_memory().unwrap();
    let idp = issuer("s3cret");
    let session =
        identity::register(&conn, &idp, &new_user("Person@Example.com", "long-enough")).unwrap();
    assert_eq!(session.user.email, "person@example.com");
    assert!(session.user.last_login_at.is_none());
    assert_eq!(
        identity::current_user(&conn, &idp, &session.tokens.access_token)
            .unwrap()
            .id,
        session.user.id
    );

    let again = identity::login(&conn, &idp, "person@example.com", "long-enough").unwrap();
    assert_eq!(again.user.id, session.user.id);
    assert!(again.user.last_login_at.is_some());
}

#[test]
fn registration_and_login_failures() {
    let conn = db::open_in_memory().unwrap();
    let idp = issuer("s3cret");
    identity::register(&conn, &idp, &new_user("dup@example.com", "long-enough")).unwrap();

    let dup = identity::register(&conn, &idp, &new_user("DUP@example.com", "long-enough"));
    assert!(matches!(dup.unwrap_err(), Error::Conflict(_)));

    let short = identity::register(&conn, &idp, &new_user("short@example.com", "short"));
    assert!(matches!(short.unwrap_err(), Error::Validation(_)));

    let bad_email = identity::register(&conn, &idp, &new_user("not-an-email", "long-enough"));
    assert!(matches!(bad_email.unwrap_err(), Error::Validation(_)));

    let wrong = identity::login(&conn, &idp, "dup@example.com", "wrong-password");
    let unknown = identity::login(&conn, &idp, "nobody@example.com", "long-enough");
    let (wrong, unknown) = (wrong.unwrap_err(), unknown.unwrap_err());
    assert!(is_auth_error(&wrong));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[test]
fn deleted_user_cannot_refresh_or_act() {
    let mut conn = db::open_in_memory().unwrap();
    let idp = issuer("s3cret");
    let session =
        identity::register(&conn, &idp, &new_user("gone@example.com", "long-enough")).unwrap();
    users::delete(&mut conn, session.user.id).unwrap();

    match identity::refresh(&conn, &idp, &session.tokens.refresh_token).unwrap_err() {
        Error::Authentication(msg) => assert_eq!(msg, "User not found"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(is_auth_error(
        &identity::current_user(&conn, &idp, &session.tokens.access_token).unwrap_err()
    ));
}
