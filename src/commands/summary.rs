// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use serde_json::json;

use crate::aggregator::{MonthInputs, MonthlySummary, compare_months, prepare_month, summarize_month};
use crate::classifier::{DUE_SOON_DAYS, due_alerts};
use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::temporal::{Month, today};
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, month_arg, pretty_table};

pub fn summary<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_arg(sub)?;
    let prep = prepare_month(store, month, today())?;
    let s = summarize_month(store, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    if prep.auto_settled > 0 {
        println!("Auto-settled {} item(s) due by today", prep.auto_settled);
    }
    if prep.rolled_over > 0 {
        println!(
            "Rolled {} unpaid item(s) from {} into {}",
            prep.rolled_over,
            month.previous(),
            month
        );
    }
    let rows = vec![
        vec!["Income".into(), fmt_money(&s.income)],
        vec!["Installments".into(), fmt_money(&s.installments_total)],
        vec!["Bills".into(), fmt_money(&s.bills_total)],
        vec!["Daily expenses".into(), fmt_money(&s.daily_expense_total)],
        vec!["External expenses".into(), fmt_money(&s.external_total)],
        vec!["Total expenses".into(), fmt_money(&s.total_expenses)],
        vec!["Actual savings".into(), fmt_money(&s.actual_savings)],
        vec!["Saving target".into(), fmt_money(&s.saving_target)],
        vec!["Savings rate".into(), fmt_percent(s.savings_rate)],
        vec!["Target achieved".into(), fmt_percent(s.target_achievement)],
    ];
    println!("Summary for {}", month);
    println!("{}", pretty_table(&["", "Amount"], rows));
    Ok(())
}

fn comparison_rows(prev: &MonthlySummary, cur: &MonthlySummary) -> Vec<(&'static str, Decimal, Decimal)> {
    vec![
        ("Income", prev.income, cur.income),
        ("Recurring", prev.recurring_total, cur.recurring_total),
        ("Daily expenses", prev.daily_expense_total, cur.daily_expense_total),
        ("External expenses", prev.external_total, cur.external_total),
        ("Total expenses", prev.total_expenses, cur.total_expenses),
        ("Actual savings", prev.actual_savings, cur.actual_savings),
    ]
}

pub fn compare<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_arg(sub)?;
    let (prev, cur) = compare_months(store, month)?;
    let lines = comparison_rows(&prev, &cur);

    let data = json!({
        "previous": prev,
        "current": cur,
        "delta": lines
            .iter()
            .map(|(label, p, c)| json!({ "field": label, "delta": c - p }))
            .collect::<Vec<_>>(),
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }

    let rows = lines
        .into_iter()
        .map(|(label, p, c)| {
            vec![
                label.to_string(),
                fmt_money(&p),
                fmt_money(&c),
                fmt_money(&(c - p)),
            ]
        })
        .collect();
    let (prev_label, cur_label) = (prev.month.to_string(), cur.month.to_string());
    println!(
        "{}",
        pretty_table(&["", prev_label.as_str(), cur_label.as_str(), "Change"], rows)
    );
    Ok(())
}

pub fn alerts<R: RemoteStore, L: LocalStore>(store: &mut ReconcilingStore<R, L>) -> Result<()> {
    let today = today();
    let inputs = MonthInputs::load(store)?;
    let count = due_alerts(store.ledger(), inputs.obligations(), Month::of(today), today);
    if count == 0 {
        println!("Nothing due in the next {} days", DUE_SOON_DAYS);
    } else {
        println!(
            "{} unpaid item(s) due within {} days or overdue",
            count, DUE_SOON_DAYS
        );
    }
    Ok(())
}
