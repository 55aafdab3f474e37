// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use payfolio::balance::{balance_effect, delete_transaction, record_transaction, reversal_effect};
use payfolio::ledger::{accounts, transactions, users};
use payfolio::models::{
    Account, NewAccount, NewTransaction, NewUser, TransactionFilter, TransactionType, User,
};
use payfolio::{Error, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, User) {
    let conn = db::open_in_memory().unwrap();
    let user = register(&conn, "owner@example.com");
    (conn, user)
}

fn register(conn: &Connection, email: &str) -> User {
    users::register(
        conn,
        &NewUser {
            email: email.into(),
            password: "correct-horse".into(),
            full_name: None,
        },
    )
    .unwrap()
}

fn bank_account(conn: &mut Connection, user: &User, balance: Decimal) -> Account {
    accounts::create(
        conn,
        user.id,
        &NewAccount {
            name: "Checking".into(),
            account_type: Some("bank".into()),
            current_balance: balance,
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap()
}

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn balance_of(conn: &Connection, user: &User, acct: &Account) -> Decimal {
    accounts::get(conn, user.id, acct.id).unwrap().current_balance
}

#[test]
fn effects_follow_transaction_type() {
    assert_eq!(balance_effect(TransactionType::Credit, dec!(25.50)), dec!(25.50));
    assert_eq!(balance_effect(TransactionType::Debit, dec!(50)), dec!(-50));
    assert_eq!(balance_effect(TransactionType::Debit, dec!(-50)), dec!(-50));
    assert_eq!(balance_effect(TransactionType::Transfer, dec!(99)), Decimal::ZERO);
    assert_eq!(reversal_effect(TransactionType::Debit, dec!(-50)), dec!(50));
    assert_eq!(reversal_effect(TransactionType::Credit, dec!(10)), dec!(-10));
}

#[test]
fn debit_sign_is_normalised() {
    let (mut conn, user) = setup();
    let acct = bank_account(&mut conn, &user, dec!(200.00));

    record_transaction(
        &mut conn,
        user.id,
        &NewTransaction::new(acct.id, dec!(50.00), TransactionType::Debit, day(2)),
    )
    .unwrap();
    assert_eq!(balance_of(&conn, &user, &acct), dec!(150.00));

    record_transaction(
        &mut conn,
        user.id,
        &NewTransaction::new(acct.id, dec!(-50.00), TransactionType::Debit, day(3)),
    )
    .unwrap();
    assert_eq!(balance_of(&conn, &user, &acct), dec!(100.00));
}

#[test]
fn transfer_leaves_balance_alone() {
    let (mut conn, user) = setup();
    let acct = bank_account(&mut conn, &user, dec!(80));
    let txn = record_transaction(
        &mut conn,
        user.id,
        &NewTransaction::new(acct.id, dec!(30), TransactionType::Transfer, day(4)),
    )
    .unwrap();
    assert_eq!(txn.transaction_type, TransactionType::Transfer);
    assert_eq!(balance_of(&conn, &user, &acct), dec!(80));

    delete_transaction(&mut conn, user.id, txn.id).unwrap();
    assert_eq!(balance_of(&conn, &user, &acct), dec!(80));
}

#[test]
fn deleting_every_transaction_restores_the_balance() {
    let (mut conn, user) = setup();
    let acct = bank_account(&mut conn, &user, dec!(100.00));

    let cases = [
        (dec!(25.50), TransactionType::Credit),
        (dec!(-12.25), TransactionType::Debit),
        (dec!(40), TransactionType::Debit),
        (dec!(7), TransactionType::Transfer),
        (dec!(0.01), TransactionType::Credit),
    ];
    let mut ids = Vec::new();
    for (i, (amount, kind)) in cases.iter().enumerate() {
        let t = record_transaction(
            &mut conn,
            user.id,
            &NewTransaction::new(acct.id, *amount, *kind, day(i as u32 + 1)),
        )
        .unwrap();
        ids.push(t.id);
    }
    // 100 + 25.50 - 12.25 - 40 + 0.01
    assert_eq!(balance_of(&conn, &user, &acct), dec!(73.26));

    for id in ids.iter().rev() {
        delete_transaction(&mut conn, user.id, *id).unwrap();
    }
    assert_eq!(balance_of(&conn, &user, &acct), dec!(100.00));
    let page = transactions::list(&conn, user.id, &TransactionFilter::default()).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn transaction_copies_account_currency_and_rounds_amount() {
    let (mut conn, user) = setup();
    let acct = bank_account(&mut conn, &user, dec!(0));
    let txn = record_transaction(
        &mut conn,
        user.id,
        &NewTransaction::new(acct.id, dec!(10.005), TransactionType::Credit, day(5)),
    )
    .unwrap();
    assert_eq!(txn.currency, "INR");
    // half-even: 10.005 -> 10.00
    assert_eq!(txn.amount, dec!(10.00));
    assert_eq!(balance_of(&conn, &user, &acct), dec!(10.00));
}

#[test]
fn foreign_account_is_not_found_and_nothing_changes() {
    let (mut conn, owner) = setup();
    let intruder = register(&conn, "intruder@example.com");
    let acct = bank_account(&mut conn, &owner, dec!(500));

    let err = record_transaction(
        &mut conn,
        intruder.id,
        &NewTransaction::new(acct.id, dec!(100), TransactionType::Debit, day(6)),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotFound("Account")));
    assert_eq!(balance_of(&conn, &owner, &acct), dec!(500));
    let page = transactions::list(&conn, intruder.id, &TransactionFilter::default()).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn unknown_category_rolls_back() {
    let (mut conn, user) = setup();
    let acct = bank_account(&mut conn, &user, dec!(10));
    let mut new = NewTransaction::new(acct.id, dec!(5), TransactionType::Credit, day(7));
    new.category_id = Some(9999);

    let err = record_transaction(&mut conn, user.id, &new).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(balance_of(&conn, &user, &acct), dec!(10));
}

#[test]
fn deleting_someone_elses_transaction_is_not_found() {
    let (mut conn, owner) = setup();
    let other = register(&conn, "other@example.com");
    let acct = bank_account(&mut conn, &owner, dec!(10));
    let txn = record_transaction(
        &mut conn,
        owner.id,
        &NewTransaction::new(acct.id, dec!(5), TransactionType::Credit, day(8)),
    )
    .unwrap();

    let err = delete_transaction(&mut conn, other.id, txn.id).unwrap_err();
    assert!(matches!(err, Error::NotFound("Transaction")));
    assert_eq!(balance_of(&conn, &owner, &acct), dec!(15));
}
