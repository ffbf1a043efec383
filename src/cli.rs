// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Month as YYYY-MM (default: current month)")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true)
}

fn obligation_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(
                    Arg::new("start")
                        .long("start")
                        .required(true)
                        .help("First date of the obligation, YYYY-MM-DD"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Last date, YYYY-MM-DD (omit for open-ended)"),
                )
                .arg(
                    Arg::new("due_day")
                        .long("due-day")
                        .value_parser(value_parser!(u32))
                        .help("Day of month it falls due (default: last day)"),
                ),
        )
        .subcommand(Command::new("list").arg(month_arg()).args(json_args()))
        .subcommand(
            Command::new("pay")
                .about("Toggle the paid flag for a month")
                .arg(id_arg())
                .arg(month_arg()),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn bool_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(bool))
        .help(help)
}

pub fn build_cli() -> Command {
    Command::new("pocketbook")
        .version(crate_version!())
        .about("Household finance: installments, bills, expenses, budgets, offline-first sync")
        .arg(
            Arg::new("remote")
                .long("remote")
                .env("POCKETBOOK_REMOTE")
                .global(true)
                .help("Base URL of the remote document store"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Do not contact the remote store; queue writes locally"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .env("POCKETBOOK_TIMEOUT")
                .value_parser(value_parser!(u64))
                .global(true)
                .help("Remote request timeout in seconds"),
        )
        .subcommand(
            Command::new("settings")
                .about("Salary, saving target and month-view behaviour")
                .subcommand(Command::new("show").args(json_args()))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("salary").long("salary"))
                        .arg(Arg::new("saving").long("saving").help("Monthly saving target"))
                        .arg(bool_arg("cash", "Count obligations only once paid"))
                        .arg(bool_arg("auto", "Auto-settle items on their due day"))
                        .arg(bool_arg("roll", "Roll unpaid items into the next month"))
                        .arg(Arg::new("theme").long("theme")),
                )
                .subcommand(
                    Command::new("suggest-saving").about("Set the saving target to 15% of salary"),
                ),
        )
        .subcommand(obligation_cmd("inst", "Recurring installments"))
        .subcommand(obligation_cmd("bill", "Recurring bills"))
        .subcommand(
            Command::new("exp")
                .about("Daily expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("note").long("note"))
                        .arg(
                            Arg::new("method")
                                .long("method")
                                .help("cash|card|transfer|wallet (default: cash)"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of an existing expense")
                        .arg(id_arg())
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("note").long("note"))
                        .arg(Arg::new("method").long("method")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(month_arg())
                        .arg(Arg::new("search").long("search"))
                        .args(json_args()),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("ext")
                .about("External one-off expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("note").long("note"))
                        .arg(Arg::new("paid").long("paid").action(ArgAction::SetTrue)),
                )
                .subcommand(Command::new("list").arg(month_arg()).args(json_args()))
                .subcommand(Command::new("toggle").arg(id_arg()))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("budget")
                .about("Category spending limits")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("limit").long("limit").required(true)),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("status").arg(month_arg()).args(json_args()))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("summary")
                .about("Income, expenses and savings for a month")
                .arg(month_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("compare")
                .about("Compare a month with the one before it")
                .arg(month_arg())
                .args(json_args()),
        )
        .subcommand(Command::new("alerts").about("Unpaid items due within three days"))
        .subcommand(Command::new("sync").about("Replay writes queued while offline"))
        .subcommand(Command::new("status").about("Connectivity and pending writes"))
        .subcommand(
            Command::new("import").subcommand(
                Command::new("backup")
                    .about("Restore a backup written by `export backup`")
                    .arg(Arg::new("in").long("in").required(true)),
            ),
        )
        .subcommand(
            Command::new("export")
                .subcommand(
                    Command::new("expenses")
                        .arg(month_arg())
                        .arg(Arg::new("search").long("search"))
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(Command::new("backup").arg(Arg::new("out").long("out").required(true))),
        )
}
