// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use payfolio::balance::record_transaction;
use payfolio::ledger::insights::InsightDraft;
use payfolio::ledger::{accounts, assets, insights, liabilities, subscriptions, users};
use payfolio::models::{
    NewAccount, NewAsset, NewLiability, NewTransaction, NewUser, ProfileUpdate, TransactionType,
    User,
};
use payfolio::{Error, db, portfolio};
use rusqlite::{Connection, params};
use rust_decimal_macros::dec;

fn register(conn: &Connection, email: &str) -> User {
    users::register(
        conn,
        &NewUser {
            email: email.into(),
            password: "long-enough".into(),
            full_name: None,
        },
    )
    .unwrap()
}

fn populate(conn: &mut Connection, user: &User) {
    let acct = accounts::create(
        conn,
        user.id,
        &NewAccount {
            name: "Card".into(),
            account_type: Some("credit_card".into()),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 2, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    record_transaction(
        conn,
        user.id,
        &NewTransaction::new(acct.id, dec!(-12.5), TransactionType::Debit, date),
    )
    .unwrap();
    assets::create(
        conn,
        user.id,
        &NewAsset {
            name: "Bike".into(),
            current_value: dec!(800),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    liabilities::create(
        conn,
        user.id,
        &NewLiability {
            name: "Card dues".into(),
            linked_account_id: Some(acct.id),
            current_balance: dec!(12.5),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    insights::insert_drafts(
        conn,
        user.id,
        &[InsightDraft {
            insight_type: "general".into(),
            title: "Hello".into(),
            description: String::new(),
            severity: "info".into(),
            priority: 1,
        }],
    )
    .unwrap();
    subscriptions::get_or_create_default(conn, user.id).unwrap();
    portfolio::record_snapshot(conn, user.id).unwrap();
}

fn owned_rows(conn: &Connection, table: &str, user: &User) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE user_id=?1", table),
        params![user.id.to_string()],
        |r| r.get(0),
    )
    .unwrap()
}

const OWNED: [&str; 7] = [
    "accounts",
    "transactions",
    "assets",
    "liabilities",
    "insights",
    "subscriptions",
    "net_worth_history",
];

#[test]
fn deleting_a_user_removes_everything_they_own() {
    let mut conn = db::open_in_memory().unwrap();
    let leaving = register(&conn, "leaving@example.com");
    let staying = register(&conn, "staying@example.com");
    populate(&mut conn, &leaving);
    populate(&mut conn, &staying);

    users::delete(&mut conn, leaving.id).unwrap();

    for table in OWNED {
        assert_eq!(owned_rows(&conn, table, &leaving), 0, "{table}");
        assert_eq!(owned_rows(&conn, table, &staying), 1, "{table}");
    }
    assert!(matches!(
        users::get(&conn, leaving.id).unwrap_err(),
        Error::NotFound("User")
    ));
    assert!(matches!(
        users::delete(&mut conn, leaving.id).unwrap_err(),
        Error::NotFound("User")
    ));
}

#[test]
fn profile_update_normalises_and_validates() {
    let conn = db::open_in_memory().unwrap();
    let user = register(&conn, "profile@example.com");
    assert_eq!(user.currency, "INR");
    assert_eq!(user.theme, "dark");

    let updated = users::update_profile(
        &conn,
        user.id,
        &ProfileUpdate {
            full_name: Some("  Asha Rao ".into()),
            currency: Some("usd".into()),
            theme: Some("Light".into()),
        },
    )
    .unwrap();
    assert_eq!(updated.full_name.as_deref(), Some("Asha Rao"));
    assert_eq!(updated.currency, "USD");
    assert_eq!(updated.theme, "light");

    let bad_theme = users::update_profile(
        &conn,
        user.id,
        &ProfileUpdate {
            theme: Some("neon".into()),
            ..Default::default()
        },
    );
    assert!(matches!(bad_theme.unwrap_err(), Error::Validation(_)));

    let bad_currency = users::update_profile(
        &conn,
        user.id,
        &ProfileUpdate {
            currency: Some("dollars".into()),
            ..Default::default()
        },
    );
    assert!(matches!(bad_currency.unwrap_err(), Error::Validation(_)));
    assert_eq!(users::get(&conn, user.id).unwrap().theme, "light");
}

#[test]
fn authenticate_records_last_login() {
    let conn = db::open_in_memory().unwrap();
    let user = register(&conn, "login@example.com");
    assert!(user.last_login_at.is_none());
    let back = users::authenticate(&conn, " LOGIN@example.com ", "long-enough").unwrap();
    assert_eq!(back.id, user.id);
    assert!(back.last_login_at.is_some());
}

#[test]
fn unique_email_violation_on_insert_is_a_conflict() {
    let conn = db::open_in_memory().unwrap();
    // A row for the same email lands between the existence check and the insert.
    conn.execute_batch(
        "CREATE TEMP TRIGGER interleaved BEFORE INSERT ON main.users
         WHEN NEW.email = 'race@example.com'
         BEGIN
             INSERT INTO users(id, email, password_hash, created_at, updated_at)
             VALUES ('other', 'RACE@example.com', 'x', '2025-01-01', '2025-01-01');
         END;",
    )
    .unwrap();

    let err = users::register(
        &conn,
        &NewUser {
            email: "race@example.com".into(),
            password: "long-enough".into(),
            full_name: None,
        },
    )
    .unwrap_err();
    match err {
        Error::Conflict(msg) => assert_eq!(msg, "Email already registered"),
        other => panic!("unexpected {other:?}"),
    }
}
