// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Record id")
}

fn account_arg() -> Arg {
    Arg::new("id").required(true).help("Account id or name")
}

pub fn build_cli() -> Command {
    Command::new("payfolio")
        .version(crate_version!())
        .about("Personal finance aggregation: accounts, net worth and insights")
        .arg(
            Arg::new("token")
                .long("token")
                .env("PAYFOLIO_TOKEN")
                .global(true)
                .hide_env_values(true)
                .help("Access token of the acting user"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print JSON instead of tables"),
        )
        .subcommand(Command::new("init").about("Create the database and seed reference data"))
        .subcommand(auth_cmd())
        .subcommand(user_cmd())
        .subcommand(account_cmd())
        .subcommand(tx_cmd())
        .subcommand(asset_cmd())
        .subcommand(liability_cmd())
        .subcommand(insight_cmd())
        .subcommand(billing_cmd())
        .subcommand(
            Command::new("category")
                .about("Reference data")
                .subcommand(Command::new("list").about("List categories"))
                .subcommand(Command::new("types").about("List account types")),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Export the acting user's transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .value_parser(["csv", "json"])
                            .default_value("csv"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
}

fn auth_cmd() -> Command {
    Command::new("auth")
        .about("Register, log in and refresh sessions")
        .subcommand(
            Command::new("register")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true))
                .arg(Arg::new("name").long("name")),
        )
        .subcommand(
            Command::new("login")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true)),
        )
        .subcommand(
            Command::new("refresh").arg(
                Arg::new("refresh_token")
                    .required(true)
                    .help("Refresh token from register or login"),
            ),
        )
        .subcommand(Command::new("whoami").about("Show the user behind --token"))
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Profile, net worth and account deletion")
        .subcommand(Command::new("show"))
        .subcommand(
            Command::new("update")
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("theme").long("theme")),
        )
        .subcommand(Command::new("portfolio").about("Net worth summary and breakdown"))
        .subcommand(Command::new("snapshot").about("Record today's net worth"))
        .subcommand(
            Command::new("history")
                .about("Net worth history with growth")
                .arg(Arg::new("since").long("since").help("YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete the user and everything they own")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .required(true),
                ),
        )
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("bank|investment|crypto|wallet|credit_card|loan"),
                )
                .arg(Arg::new("institution").long("institution"))
                .arg(Arg::new("balance").long("balance").default_value("0"))
                .arg(Arg::new("currency").long("currency"))
                .arg(
                    Arg::new("connection")
                        .long("connection")
                        .value_parser(["manual", "linked"])
                        .default_value("manual"),
                ),
        )
        .subcommand(
            Command::new("list").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include archived accounts"),
            ),
        )
        .subcommand(Command::new("show").arg(account_arg()))
        .subcommand(
            Command::new("update")
                .arg(account_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("institution").long("institution"))
                .arg(Arg::new("balance").long("balance"))
                .arg(
                    Arg::new("hidden")
                        .long("hidden")
                        .value_parser(clap::value_parser!(bool)),
                ),
        )
        .subcommand(Command::new("archive").arg(account_arg()))
        .subcommand(Command::new("unarchive").arg(account_arg()))
        .subcommand(Command::new("rm").arg(account_arg()))
        .subcommand(Command::new("sync").arg(account_arg()))
        .subcommand(Command::new("limits").about("Active accounts against the plan allowance"))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and inspect transactions")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("account").long("account").required(true))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .allow_hyphen_values(true),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .value_parser(["credit", "debit", "transfer"]),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .required(true)
                        .help("YYYY-MM-DD or 'YYYY-MM-DD HH:MM:SS'"),
                )
                .arg(Arg::new("merchant").long("merchant"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("category").long("category").help("Category id or name"))
                .arg(Arg::new("tag").long("tag").action(ArgAction::Append))
                .arg(Arg::new("recurring").long("recurring").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("list")
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_parser(["credit", "debit", "transfer"]),
                )
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("50"),
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("0"),
                ),
        )
        .subcommand(Command::new("show").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(Arg::new("merchant").long("merchant"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("tag").long("tag").action(ArgAction::Append)),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("stats")
                .about("Income, expenses, categories and top merchants")
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true)),
        )
}

fn asset_cmd() -> Command {
    Command::new("asset")
        .about("Manual assets such as property, vehicles or gold")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("value").long("value").required(true))
                .arg(Arg::new("purchase_value").long("purchase-value"))
                .arg(Arg::new("purchase_date").long("purchase-date"))
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("list"))
        .subcommand(Command::new("show").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("value").long("value"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn liability_cmd() -> Command {
    Command::new("liability")
        .about("Loans, cards and other debts")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("balance").long("balance").required(true))
                .arg(Arg::new("principal").long("principal"))
                .arg(Arg::new("rate").long("rate").help("Annual interest rate, percent"))
                .arg(Arg::new("emi").long("emi"))
                .arg(
                    Arg::new("emi_day")
                        .long("emi-day")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(Arg::new("start").long("start"))
                .arg(Arg::new("end").long("end"))
                .arg(Arg::new("lender").long("lender"))
                .arg(Arg::new("account").long("account").help("Linked account id or name"))
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("list"))
        .subcommand(Command::new("show").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(Arg::new("balance").long("balance"))
                .arg(Arg::new("emi").long("emi"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn insight_cmd() -> Command {
    Command::new("insight")
        .about("Generated financial insights")
        .subcommand(
            Command::new("list").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include dismissed insights"),
            ),
        )
        .subcommand(Command::new("read").arg(id_arg()))
        .subcommand(Command::new("dismiss").arg(id_arg()))
        .subcommand(Command::new("generate"))
}

fn billing_cmd() -> Command {
    Command::new("billing")
        .about("Plan and checkout")
        .subcommand(Command::new("status"))
        .subcommand(
            Command::new("checkout")
                .arg(Arg::new("plan").long("plan").required(true))
                .arg(Arg::new("cycle").long("cycle").default_value("monthly"))
                .arg(Arg::new("provider").long("provider").default_value("stripe")),
        )
        .subcommand(
            Command::new("webhook")
                .about("Acknowledge a provider event")
                .arg(Arg::new("payload").long("payload").default_value("{}")),
        )
}
