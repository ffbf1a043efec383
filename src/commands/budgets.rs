// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregator::{BudgetLevel, budget_usage};
use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::utils::{fmt_money, maybe_print_json, month_arg, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("status", sub)) => status(store, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store.delete_budget(id)?;
            println!("Budget {} removed", id);
        }
        _ => {}
    }
    Ok(())
}

fn set<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let cat = sub.get_one::<String>("category").unwrap();
    let limit = parse_decimal(sub.get_one::<String>("limit").unwrap())?;
    let budget = store.save_budget(cat, limit)?;
    println!("Budget set for {} = {}", budget.category, fmt_money(&budget.limit));
    Ok(())
}

fn list<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let mut budgets = store.budgets()?;
    budgets.sort_by(|a, b| a.category.to_lowercase().cmp(&b.category.to_lowercase()));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        return Ok(());
    }
    let data = budgets
        .into_iter()
        .map(|b| vec![b.id, b.category, fmt_money(&b.limit)])
        .collect();
    println!("{}", pretty_table(&["ID", "Category", "Limit"], data));
    Ok(())
}

fn status<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_arg(sub)?;
    let budgets = store.budgets()?;
    let expenses = store.expenses(Some(month))?;
    let usage = budget_usage(&budgets, &expenses, month);

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &usage)? {
        return Ok(());
    }
    let data = usage
        .iter()
        .map(|u| {
            let level = match u.level {
                BudgetLevel::Ok => "ok",
                BudgetLevel::Warning => "warning",
                BudgetLevel::Exceeded => "exceeded",
            };
            vec![
                u.category.clone(),
                fmt_money(&u.limit),
                fmt_money(&u.spent),
                format!("{:.1}%", u.percent),
                level.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Limit", "Spent", "Used", "Level"], data)
    );
    Ok(())
}
