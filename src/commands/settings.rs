// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub)?,
        Some(("set", sub)) => set(store, sub)?,
        Some(("suggest-saving", _)) => suggest_saving(store)?,
        _ => {}
    }
    Ok(())
}

fn show<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let s = store.settings()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Salary".into(), fmt_money(&s.salary)],
        vec!["Saving target".into(), fmt_money(&s.saving)],
        vec!["Cash mode".into(), s.cash.to_string()],
        vec!["Auto-settle".into(), s.auto.to_string()],
        vec!["Rollover".into(), s.roll.to_string()],
        vec!["Theme".into(), s.theme.clone()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

fn set<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let mut s = store.settings()?;
    if let Some(v) = sub.get_one::<String>("salary") {
        let salary = parse_decimal(v)?;
        if salary < rust_decimal::Decimal::ZERO {
            anyhow::bail!("Salary must not be negative");
        }
        s.salary = salary;
    }
    if let Some(v) = sub.get_one::<String>("saving") {
        let saving = parse_decimal(v)?;
        if saving < rust_decimal::Decimal::ZERO {
            anyhow::bail!("Saving target must not be negative");
        }
        s.saving = saving;
    }
    if let Some(v) = sub.get_one::<bool>("cash") {
        s.cash = *v;
    }
    if let Some(v) = sub.get_one::<bool>("auto") {
        s.auto = *v;
    }
    if let Some(v) = sub.get_one::<bool>("roll") {
        s.roll = *v;
    }
    if let Some(v) = sub.get_one::<String>("theme") {
        s.theme = v.clone();
    }
    store.save_settings(&s)?;
    println!("Settings saved");
    Ok(())
}

fn suggest_saving<R: RemoteStore, L: LocalStore>(store: &mut ReconcilingStore<R, L>) -> Result<()> {
    let mut s = store.settings()?;
    if s.salary.is_zero() {
        println!("Set a salary first (settings set --salary ...)");
        return Ok(());
    }
    s.saving = s.suggested_saving();
    store.save_settings(&s)?;
    println!("Saving target set to {}", fmt_money(&s.saving));
    Ok(())
}
