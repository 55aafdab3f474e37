// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use payfolio::balance::record_transaction;
use payfolio::ledger::insights::InsightDraft;
use payfolio::ledger::{accounts, assets, insights, liabilities, transactions, users};
use payfolio::models::{
    AccountUpdate, AssetUpdate, NewAccount, NewAsset, NewLiability, NewTransaction, NewUser,
    TransactionFilter, TransactionType, TransactionUpdate, User,
};
use payfolio::{Error, db, portfolio};
use rusqlite::Connection;
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

fn assert_not_found<T: std::fmt::Debug>(res: payfolio::Result<T>, entity: &str) {
    match res {
        Err(Error::NotFound(e)) => assert_eq!(e, entity),
        other => panic!("expected {entity} not found, got {other:?}"),
    }
}

#[test]
fn every_entity_is_invisible_to_other_users() {
    let mut conn = db::open_in_memory().unwrap();
    let alice = register(&conn, "alice@example.com");
    let bob = register(&conn, "bob@example.com");

    let acct = accounts::create(
        &mut conn,
        alice.id,
        &NewAccount {
            name: "Alice bank".into(),
            account_type: Some("bank".into()),
            current_balance: dec!(1000),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let txn = record_transaction(
        &mut conn,
        alice.id,
        &NewTransaction::new(acct.id, dec!(-20), TransactionType::Debit, date),
    )
    .unwrap();
    let asset = assets::create(
        &conn,
        alice.id,
        &NewAsset {
            name: "Flat".into(),
            current_value: dec!(5000),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let loan = liabilities::create(
        &conn,
        alice.id,
        &NewLiability {
            name: "Home loan".into(),
            current_balance: dec!(3000),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let ids = insights::insert_drafts(
        &mut conn,
        alice.id,
        &[InsightDraft {
            insight_type: "general".into(),
            title: "Private".into(),
            description: String::new(),
            severity: "info".into(),
            priority: 5,
        }],
    )
    .unwrap();

    // accounts
    assert_not_found(accounts::get(&conn, bob.id, acct.id), "Account");
    assert_not_found(
        accounts::update(&mut conn, bob.id, acct.id, &AccountUpdate::default()),
        "Account",
    );
    assert_not_found(accounts::delete(&conn, bob.id, acct.id), "Account");
    assert_not_found(accounts::sync(&conn, bob.id, acct.id), "Account");
    assert_eq!(accounts::list(&conn, bob.id, true).unwrap().total, 0);

    // transactions
    assert_not_found(transactions::get(&conn, bob.id, txn.id), "Transaction");
    assert_not_found(
        transactions::update(&conn, bob.id, txn.id, &TransactionUpdate::default()),
        "Transaction",
    );
    let page = transactions::list(&conn, bob.id, &TransactionFilter::default()).unwrap();
    assert_eq!(page.total, 0);

    // assets and liabilities
    assert_not_found(assets::get(&conn, bob.id, asset.id), "Asset");
    assert_not_found(
        assets::update(&conn, bob.id, asset.id, &AssetUpdate::default()),
        "Asset",
    );
    assert_not_found(assets::delete(&conn, bob.id, asset.id), "Asset");
    assert_not_found(liabilities::get(&conn, bob.id, loan.id), "Liability");
    assert_not_found(liabilities::delete(&conn, bob.id, loan.id), "Liability");

    // insights
    assert_not_found(insights::mark_read(&conn, bob.id, ids[0]), "Insight");
    assert_not_found(insights::dismiss(&conn, bob.id, ids[0]), "Insight");
    assert!(insights::list(&conn, bob.id, true).unwrap().insights.is_empty());

    // aggregates only see Bob's (empty) data
    let s = portfolio::summary(&conn, bob.id).unwrap();
    assert_eq!(s.net_worth, dec!(0));
    assert_eq!(s.connected_accounts, 0);

    // Alice's data is untouched
    assert_eq!(accounts::get(&conn, alice.id, acct.id).unwrap().current_balance, dec!(980));
    assert!(!insights::get(&conn, alice.id, ids[0]).unwrap().is_read);
}

#[test]
fn liability_cannot_link_to_someone_elses_account() {
    let mut conn = db::open_in_memory().unwrap();
    let alice = register(&conn, "alice@example.com");
    let bob = register(&conn, "bob@example.com");
    let acct = accounts::create(
        &mut conn,
        alice.id,
        &NewAccount {
            name: "Card".into(),
            account_type: Some("credit_card".into()),
            currency: "INR".into(),
            ..Default::default()
        },
    )
    .unwrap();

    let res = liabilities::create(
        &conn,
        bob.id,
        &NewLiability {
            name: "Sneaky".into(),
            linked_account_id: Some(acct.id),
            current_balance: dec!(10),
            currency: "INR".into(),
            ..Default::default()
        },
    );
    assert_not_found(res, "Account");
}
