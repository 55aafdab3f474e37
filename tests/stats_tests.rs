// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use payfolio::balance::record_transaction;
use payfolio::ledger::{accounts, subscriptions, users};
use payfolio::models::{Account, NewAccount, NewTransaction, NewUser, TransactionType, User};
use payfolio::stats::transaction_stats;
use payfolio::utils::{parse_datetime, parse_datetime_end};
use payfolio::{Error, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, User, Account) {
    let mut conn = db::open_in_memory().unwrap();
    let user = users::register(
        &conn,
        &NewUser {
            email: "stats@example.com".into(),
            password: "long-enough".into(),
            full_name: None,
        },
    )
    .unwrap();
    let acct = accounts::create(
        &mut conn,
        user.id,
        &NewAccount {
            name: "Spending".into(),
            account_type: Some("bank".into()),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    (conn, user, acct)
}

fn txn(
    conn: &mut Connection,
    user: &User,
    acct: &Account,
    amount: Decimal,
    kind: TransactionType,
    when: &str,
    merchant: Option<&str>,
    category: Option<i64>,
) {
    let mut new = NewTransaction::new(acct.id, amount, kind, parse_datetime(when).unwrap());
    new.merchant_name = merchant.map(str::to_string);
    new.category_id = category;
    record_transaction(conn, user.id, &new).unwrap();
}

const GROCERIES: i64 = 11;
const DINING: i64 = 12;
const SALARY: i64 = 2;

#[test]
fn top_merchants_rank_largest_spend_first() {
    let (mut conn, user, acct) = setup();
    let d = "2025-03-10";
    txn(&mut conn, &user, &acct, dec!(-10), TransactionType::Debit, d, Some("Cafe"), None);
    txn(&mut conn, &user, &acct, dec!(-50), TransactionType::Debit, d, Some("Grocer"), None);
    txn(&mut conn, &user, &acct, dec!(-5), TransactionType::Debit, d, Some("Kiosk"), None);
    txn(&mut conn, &user, &acct, dec!(-7), TransactionType::Debit, d, None, None);
    txn(&mut conn, &user, &acct, dec!(900), TransactionType::Credit, d, Some("Employer"), None);

    let s = transaction_stats(
        &conn,
        user.id,
        parse_datetime("2025-03-01").unwrap(),
        parse_datetime_end("2025-03-31").unwrap(),
    )
    .unwrap();

    let names: Vec<&str> = s.top_merchants.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Grocer", "Cafe", "Unknown", "Kiosk"]);
    assert_eq!(s.top_merchants[0].amount, dec!(50));
    assert_eq!(s.top_merchants[0].count, 1);
    assert_eq!(s.total_income, dec!(900));
    assert_eq!(s.total_expenses, dec!(72));
    assert_eq!(s.net_cash_flow, dec!(828));
}

#[test]
fn top_merchants_are_capped_and_grouped() {
    let (mut conn, user, acct) = setup();
    for (i, m) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
        let amount = -Decimal::from(i as i64 + 1);
        txn(&mut conn, &user, &acct, amount, TransactionType::Debit, "2025-04-02", Some(*m), None);
    }
    txn(&mut conn, &user, &acct, dec!(-1), TransactionType::Debit, "2025-04-03", Some("A"), None);

    let s = transaction_stats(
        &conn,
        user.id,
        parse_datetime("2025-04-01").unwrap(),
        parse_datetime_end("2025-04-30").unwrap(),
    )
    .unwrap();
    assert_eq!(s.top_merchants.len(), 5);
    assert_eq!(s.top_merchants[0].name, "F");
    let a = s.top_merchants.iter().find(|m| m.name == "A").unwrap();
    assert_eq!(a.amount, dec!(2));
    assert_eq!(a.count, 2);
}

#[test]
fn range_is_inclusive_on_both_ends() {
    let (mut conn, user, acct) = setup();
    let credit = TransactionType::Credit;
    txn(&mut conn, &user, &acct, dec!(1), credit, "2025-01-31 23:59:59", None, None);
    txn(&mut conn, &user, &acct, dec!(10), credit, "2025-02-01 00:00:00", None, None);
    txn(&mut conn, &user, &acct, dec!(100), credit, "2025-02-28 23:59:59", None, None);
    txn(&mut conn, &user, &acct, dec!(1000), credit, "2025-03-01 00:00:00", None, None);

    let s = transaction_stats(
        &conn,
        user.id,
        parse_datetime("2025-02-01").unwrap(),
        parse_datetime_end("2025-02-28").unwrap(),
    )
    .unwrap();
    assert_eq!(s.total_income, dec!(110));
}

#[test]
fn categories_keep_the_stored_sign() {
    let (mut conn, user, acct) = setup();
    let d = "2025-05-05";
    txn(&mut conn, &user, &acct, dec!(-10), TransactionType::Debit, d, None, Some(GROCERIES));
    txn(&mut conn, &user, &acct, dec!(-5), TransactionType::Debit, d, None, Some(GROCERIES));
    txn(&mut conn, &user, &acct, dec!(-20), TransactionType::Debit, d, None, Some(DINING));
    txn(&mut conn, &user, &acct, dec!(300), TransactionType::Credit, d, None, Some(SALARY));
    txn(&mut conn, &user, &acct, dec!(-3), TransactionType::Debit, d, None, None);

    let s = transaction_stats(
        &conn,
        user.id,
        parse_datetime(d).unwrap(),
        parse_datetime_end(d).unwrap(),
    )
    .unwrap();

    assert_eq!(s.by_category.len(), 3);
    let groceries = s.by_category.iter().find(|c| c.category == "Groceries").unwrap();
    assert_eq!(groceries.amount, dec!(-15));
    let salary = s.by_category.iter().find(|c| c.category == "Salary").unwrap();
    assert_eq!(salary.amount, dec!(300));
    assert!(s.by_category.iter().all(|c| c.percent == 0.0));
}

#[test]
fn empty_range_is_all_zero() {
    let (conn, user, _acct) = setup();
    let s = transaction_stats(
        &conn,
        user.id,
        parse_datetime("2024-01-01").unwrap(),
        parse_datetime_end("2024-12-31").unwrap(),
    )
    .unwrap();
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.total_expenses, Decimal::ZERO);
    assert!(s.by_category.is_empty());
    assert!(s.top_merchants.is_empty());
}

#[test]
fn inverted_range_is_rejected() {
    let (conn, user, _acct) = setup();
    let err = transaction_stats(
        &conn,
        user.id,
        parse_datetime("2025-02-01").unwrap(),
        parse_datetime("2025-01-01").unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn income_beyond_decimal_range_fails_instead_of_panicking() {
    let (mut conn, user, acct) = setup();
    subscriptions::set_max_accounts(&conn, user.id, 10).unwrap();
    let other = accounts::create(
        &mut conn,
        user.id,
        &NewAccount {
            name: "Savings".into(),
            account_type: Some("bank".into()),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let d = "2025-05-05";
    let huge = dec!(50000000000000000000000000000);
    txn(&mut conn, &user, &acct, huge, TransactionType::Credit, d, None, None);
    txn(&mut conn, &user, &other, huge, TransactionType::Credit, d, None, None);

    let err = transaction_stats(
        &conn,
        user.id,
        parse_datetime(d).unwrap(),
        parse_datetime_end(d).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
