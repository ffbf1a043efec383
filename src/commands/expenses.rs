// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use regex::RegexBuilder;

use crate::aggregator::{BudgetLevel, category_budget_usage};
use crate::models::{Expense, NewExpense, PaymentMethod};
use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::utils::{fmt_money, maybe_print_json, month_arg, parse_date, parse_decimal, pretty_table};

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store.delete_expense(id)?;
            println!("Expense {} removed", id);
        }
        _ => {}
    }
    Ok(())
}

/// Keeps expenses whose category or note contains `query`, ignoring case.
/// A blank query keeps everything.
pub fn search_expenses(items: Vec<Expense>, query: Option<&str>) -> Result<Vec<Expense>> {
    let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(items);
    };
    let re = RegexBuilder::new(&regex::escape(q))
        .case_insensitive(true)
        .build()?;
    Ok(items
        .into_iter()
        .filter(|e| re.is_match(&e.category) || re.is_match(&e.note))
        .collect())
}

fn add<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let method = match sub.get_one::<String>("method") {
        Some(s) => s.parse::<PaymentMethod>()?,
        None => PaymentMethod::default(),
    };
    let draft = NewExpense {
        date: parse_date(sub.get_one::<String>("date").unwrap())?,
        category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        note: sub.get_one::<String>("note").cloned().unwrap_or_default(),
        method,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
    };
    let created = store.add_expense(&draft)?;
    println!(
        "Added expense {} on {}: {} {}",
        created.id,
        created.date,
        created.category,
        fmt_money(&created.amount)
    );
    warn_budget(store, &created)
}

fn edit<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let Some(current) = store.expenses(None)?.into_iter().find(|e| &e.id == id) else {
        anyhow::bail!("No expense with id {}", id);
    };
    let mut draft = NewExpense {
        date: current.date,
        category: current.category,
        note: current.note,
        method: current.method,
        amount: current.amount,
    };
    if let Some(v) = sub.get_one::<String>("date") {
        draft.date = parse_date(v)?;
    }
    if let Some(v) = sub.get_one::<String>("category") {
        draft.category = v.trim().to_string();
    }
    if let Some(v) = sub.get_one::<String>("amount") {
        draft.amount = parse_decimal(v)?;
    }
    if let Some(v) = sub.get_one::<String>("note") {
        draft.note = v.clone();
    }
    if let Some(v) = sub.get_one::<String>("method") {
        draft.method = v.parse()?;
    }
    let updated = store.update_expense(id, &draft)?;
    println!("Expense {} updated", updated.id);
    warn_budget(store, &updated)
}

fn warn_budget<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    added: &Expense,
) -> Result<()> {
    let month = added.month();
    let budgets = store.budgets()?;
    let expenses = store.expenses(Some(month))?;
    let Some(usage) = category_budget_usage(&budgets, &expenses, &added.category, month) else {
        return Ok(());
    };
    match usage.level {
        BudgetLevel::Exceeded => println!(
            "Budget for {} exceeded: {:.1}% of {} used in {}",
            usage.category,
            usage.percent,
            fmt_money(&usage.limit),
            month
        ),
        BudgetLevel::Warning => println!(
            "Budget for {} nearly used up: {:.1}% of {} in {}",
            usage.category,
            usage.percent,
            fmt_money(&usage.limit),
            month
        ),
        BudgetLevel::Ok => {}
    }
    Ok(())
}

fn list<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_arg(sub)?;
    let items = store.expenses(Some(month))?;
    let items = search_expenses(items, sub.get_one::<String>("search").map(String::as_str))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let total: rust_decimal::Decimal = items.iter().map(|e| e.amount).sum();
    let rows = items
        .iter()
        .map(|e| {
            vec![
                e.id.clone(),
                e.date.to_string(),
                e.category.clone(),
                e.note.clone(),
                e.method.to_string(),
                fmt_money(&e.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Date", "Category", "Note", "Method", "Amount"], rows)
    );
    println!("Total: {}", fmt_money(&total));
    Ok(())
}
