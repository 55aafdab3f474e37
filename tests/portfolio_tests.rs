// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use payfolio::ledger::{accounts, assets, liabilities, subscriptions, users};
use payfolio::models::{Account, NewAccount, NewAsset, NewLiability, NewUser, User};
use payfolio::{Error, db, portfolio};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, User) {
    let conn = db::open_in_memory().unwrap();
    let user = users::register(
        &conn,
        &NewUser {
            email: "networth@example.com".into(),
            password: "long-enough".into(),
            full_name: Some("Net Worth".into()),
        },
    )
    .unwrap();
    subscriptions::set_max_accounts(&conn, user.id, 10).unwrap();
    (conn, user)
}

fn account(conn: &mut Connection, user: &User, kind: Option<&str>, balance: Decimal) -> Account {
    accounts::create(
        conn,
        user.id,
        &NewAccount {
            name: format!("{} account", kind.unwrap_or("plain")),
            account_type: kind.map(str::to_string),
            current_balance: balance,
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap()
}

fn asset(conn: &Connection, user: &User, value: Decimal) {
    assets::create(
        conn,
        user.id,
        &NewAsset {
            name: "Gold".into(),
            current_value: value,
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
}

fn liability(conn: &Connection, user: &User, balance: Decimal) {
    liabilities::create(
        conn,
        user.id,
        &NewLiability {
            name: "Car loan".into(),
            current_balance: balance,
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
}

#[test]
fn net_worth_is_exact() {
    let (mut conn, user) = setup();
    account(&mut conn, &user, Some("bank"), dec!(600.00));
    account(&mut conn, &user, Some("investment"), dec!(400.00));
    asset(&conn, &user, dec!(500.00));
    liability(&conn, &user, dec!(300.00));

    let s = portfolio::summary(&conn, user.id).unwrap();
    assert_eq!(s.total_assets, dec!(1500.00));
    assert_eq!(s.total_liabilities, dec!(300.00));
    assert_eq!(s.net_worth, dec!(1200.00));
    assert_eq!(s.breakdown.banks, dec!(600.00));
    assert_eq!(s.breakdown.investments, dec!(400.00));
    assert_eq!(s.breakdown.crypto, Decimal::ZERO);
    assert_eq!(s.breakdown.wallets, Decimal::ZERO);
    assert_eq!(s.breakdown.manual_assets, dec!(500.00));
    assert_eq!(s.connected_accounts, 2);
}

#[test]
fn no_snapshot_means_no_change() {
    let (mut conn, user) = setup();
    account(&mut conn, &user, Some("bank"), dec!(250));

    let s = portfolio::summary(&conn, user.id).unwrap();
    assert_eq!(s.net_worth_change, Decimal::ZERO);
    assert_eq!(s.net_worth_change_percent, 0.0);
}

#[test]
fn zero_baseline_reports_zero_percent() {
    let (conn, user) = setup();
    let snap = portfolio::record_snapshot(&conn, user.id).unwrap();
    assert_eq!(snap.net_worth, Decimal::ZERO);

    asset(&conn, &user, dec!(50));
    let s = portfolio::summary(&conn, user.id).unwrap();
    assert_eq!(s.net_worth_change, dec!(50));
    assert_eq!(s.net_worth_change_percent, 0.0);
}

#[test]
fn change_is_measured_against_latest_snapshot() {
    let (mut conn, user) = setup();
    account(&mut conn, &user, Some("bank"), dec!(1000));
    asset(&conn, &user, dec!(500));
    liability(&conn, &user, dec!(300));
    portfolio::record_snapshot(&conn, user.id).unwrap();

    asset(&conn, &user, dec!(120));
    let s = portfolio::summary(&conn, user.id).unwrap();
    assert_eq!(s.net_worth, dec!(1320));
    assert_eq!(s.net_worth_change, dec!(120));
    assert_eq!(s.net_worth_change_percent, 10.0);
}

#[test]
fn non_asset_untyped_and_archived_accounts_are_excluded_from_totals() {
    let (mut conn, user) = setup();
    account(&mut conn, &user, Some("bank"), dec!(100));
    account(&mut conn, &user, Some("credit_card"), dec!(-40));
    // unknown type name leaves the account untyped
    let untyped = account(&mut conn, &user, Some("mystery"), dec!(70));
    assert!(untyped.account_type_id.is_none());
    let archived = account(&mut conn, &user, Some("wallet"), dec!(999));
    accounts::set_archived(&mut conn, user.id, archived.id, true).unwrap();
    account(&mut conn, &user, Some("crypto"), dec!(5.5));

    let s = portfolio::summary(&conn, user.id).unwrap();
    assert_eq!(s.total_assets, dec!(105.5));
    assert_eq!(s.breakdown.wallets, Decimal::ZERO);
    assert_eq!(s.breakdown.crypto, dec!(5.5));
    assert_eq!(s.connected_accounts, 4);

    let list = accounts::list(&conn, user.id, false).unwrap();
    assert_eq!(list.by_type.get("other"), Some(&1));
    assert_eq!(list.by_type.get("bank"), Some(&1));
    assert_eq!(list.by_type.get("wallet"), None);
}

#[test]
fn history_reports_growth_between_first_and_last() {
    let (conn, user) = setup();
    asset(&conn, &user, dec!(1000));
    portfolio::record_snapshot(&conn, user.id).unwrap();
    asset(&conn, &user, dec!(250));
    portfolio::record_snapshot(&conn, user.id).unwrap();

    let h = portfolio::history(&conn, user.id, None).unwrap();
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.history[0].net_worth, dec!(1000));
    assert_eq!(h.history[1].net_worth, dec!(1250));
    assert_eq!(h.growth.absolute, dec!(250));
    assert_eq!(h.growth.percent, 25.0);
}

#[test]
fn empty_history_has_zero_growth() {
    let (conn, user) = setup();
    let h = portfolio::history(&conn, user.id, None).unwrap();
    assert!(h.history.is_empty());
    assert_eq!(h.growth.absolute, Decimal::ZERO);
    assert_eq!(h.growth.percent, 0.0);
}

#[test]
fn totals_beyond_decimal_range_fail_instead_of_panicking() {
    let (mut conn, user) = setup();
    let huge = dec!(50000000000000000000000000000);
    account(&mut conn, &user, Some("bank"), huge);
    account(&mut conn, &user, Some("bank"), huge);

    assert!(matches!(
        portfolio::summary(&conn, user.id).unwrap_err(),
        Error::Validation(_)
    ));
    assert!(matches!(
        portfolio::record_snapshot(&conn, user.id).unwrap_err(),
        Error::Validation(_)
    ));
}

#[test]
fn liability_list_totals_beyond_decimal_range_fail() {
    let (conn, user) = setup();
    let huge = dec!(50000000000000000000000000000);
    liability(&conn, &user, huge);
    liability(&conn, &user, huge);

    assert!(matches!(
        liabilities::list(&conn, user.id).unwrap_err(),
        Error::Validation(_)
    ));
}
