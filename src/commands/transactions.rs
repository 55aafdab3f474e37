// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{arg, json_flag, opt};
use crate::balance;
use crate::ledger::transactions;
use crate::models::{NewTransaction, Transaction, TransactionFilter, TransactionUpdate, User};
use crate::stats::transaction_stats;
use crate::utils::{
    fmt_datetime, fmt_money, id_for_account, id_for_category, maybe_print_json, opt_str,
    parse_datetime, parse_datetime_end, parse_decimal, parse_uuid, pretty_table,
};

fn tags(m: &clap::ArgMatches) -> Option<Vec<String>> {
    m.get_many::<String>("tag").map(|v| v.cloned().collect())
}

pub fn new_transaction_from(
    conn: &Connection,
    user: &User,
    m: &clap::ArgMatches,
) -> Result<NewTransaction> {
    let account_id = id_for_account(conn, user.id, arg(m, "account")?)?;
    let mut new = NewTransaction::new(
        account_id,
        parse_decimal(arg(m, "amount")?)?,
        arg(m, "type")?.parse()?,
        parse_datetime(arg(m, "date")?)?,
    );
    new.merchant_name = opt(m, "merchant");
    new.description = opt(m, "description");
    new.category_id = opt(m, "category")
        .map(|c| id_for_category(conn, &c))
        .transpose()?;
    new.tags = tags(m).unwrap_or_default();
    new.is_recurring = m.get_flag("recurring");
    Ok(new)
}

/// Translates `tx list` flags into a store filter. `--to` with a bare date covers the whole day.
pub fn filter_from(conn: &Connection, user: &User, m: &clap::ArgMatches) -> Result<TransactionFilter> {
    Ok(TransactionFilter {
        account_id: opt(m, "account")
            .map(|a| id_for_account(conn, user.id, &a))
            .transpose()?,
        category_id: opt(m, "category")
            .map(|c| id_for_category(conn, &c))
            .transpose()?,
        transaction_type: opt(m, "type").map(|t| t.parse()).transpose()?,
        date_from: opt(m, "from").map(|s| parse_datetime(&s)).transpose()?,
        date_to: opt(m, "to").map(|s| parse_datetime_end(&s)).transpose()?,
        limit: m.get_one::<u32>("limit").copied().unwrap_or(50),
        offset: m.get_one::<u32>("offset").copied().unwrap_or(0),
    })
}

fn rows(txns: &[Transaction]) -> Vec<Vec<String>> {
    txns.iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                fmt_datetime(&t.transaction_date),
                opt_str(&t.account_name),
                t.transaction_type.to_string(),
                fmt_money(&t.amount, &t.currency),
                opt_str(&t.merchant_name),
                opt_str(&t.category_name),
                opt_str(&t.description),
            ]
        })
        .collect()
}

const HEADERS: [&str; 8] = [
    "Id", "Date", "Account", "Type", "Amount", "Merchant", "Category", "Description",
];

pub fn handle(conn: &mut Connection, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = new_transaction_from(conn, user, sub)?;
            let txn = balance::record_transaction(conn, user.id, &new)?;
            if !maybe_print_json(json, &txn)? {
                println!(
                    "Recorded {} of {} on '{}' ({})",
                    txn.transaction_type,
                    fmt_money(&txn.amount, &txn.currency),
                    opt_str(&txn.account_name),
                    txn.id
                );
            }
        }
        Some(("list", sub)) => {
            let filter = filter_from(conn, user, sub)?;
            let page = transactions::list(conn, user.id, &filter)?;
            if !maybe_print_json(json, &page)? {
                println!("{}", pretty_table(&HEADERS, rows(&page.transactions)));
                println!(
                    "Showing {} of {} (offset {})",
                    page.transactions.len(),
                    page.total,
                    page.offset
                );
            }
        }
        Some(("show", sub)) => {
            let txn = transactions::get(conn, user.id, parse_uuid(arg(sub, "id")?)?)?;
            if !maybe_print_json(json, &txn)? {
                println!("{}", pretty_table(&HEADERS, rows(std::slice::from_ref(&txn))));
            }
        }
        Some(("update", sub)) => {
            let upd = TransactionUpdate {
                description: opt(sub, "description"),
                merchant_name: opt(sub, "merchant"),
                category_id: opt(sub, "category")
                    .map(|c| id_for_category(conn, &c))
                    .transpose()?,
                tags: tags(sub),
            };
            let txn = transactions::update(conn, user.id, parse_uuid(arg(sub, "id")?)?, &upd)?;
            if !maybe_print_json(json, &txn)? {
                println!("Updated transaction {}", txn.id);
            }
        }
        Some(("rm", sub)) => {
            let id = parse_uuid(arg(sub, "id")?)?;
            balance::delete_transaction(conn, user.id, id)?;
            println!("Removed transaction {}", id);
        }
        Some(("stats", sub)) => {
            let from = parse_datetime(arg(sub, "from")?)?;
            let to = parse_datetime_end(arg(sub, "to")?)?;
            let stats = transaction_stats(conn, user.id, from, to)?;
            if !maybe_print_json(json, &stats)? {
                let ccy = &user.currency;
                println!(
                    "{}",
                    pretty_table(
                        &["Income", "Expenses", "Net cash flow"],
                        vec![vec![
                            fmt_money(&stats.total_income, ccy),
                            fmt_money(&stats.total_expenses, ccy),
                            fmt_money(&stats.net_cash_flow, ccy),
                        ]],
                    )
                );
                let cats = stats
                    .by_category
                    .iter()
                    .map(|c| vec![c.category.clone(), fmt_money(&c.amount, ccy)])
                    .collect();
                println!("{}", pretty_table(&["Category", "Amount"], cats));
                let merchants = stats
                    .top_merchants
                    .iter()
                    .map(|t| vec![t.name.clone(), fmt_money(&t.amount, ccy), t.count.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Merchant", "Spent", "Count"], merchants));
            }
        }
        _ => {}
    }
    Ok(())
}
