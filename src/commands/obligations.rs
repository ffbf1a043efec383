// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Installments and bills share one command surface.

use anyhow::Result;
use serde_json::json;

use crate::classifier::classify;
use crate::models::{NewObligation, ObligationKind};
use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::temporal::today;
use crate::utils::{fmt_money, maybe_print_json, month_arg, parse_date, parse_decimal, pretty_table};

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    kind: ObligationKind,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, kind, sub)?,
        Some(("list", sub)) => list(store, kind, sub)?,
        Some(("pay", sub)) => pay(store, kind, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store.delete_obligation(kind, id)?;
            println!("{} {} removed", kind.label(), id);
        }
        _ => {}
    }
    Ok(())
}

fn add<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    kind: ObligationKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let draft = NewObligation {
        name: sub.get_one::<String>("name").unwrap().trim().to_string(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        start: parse_date(sub.get_one::<String>("start").unwrap())?,
        end: sub
            .get_one::<String>("end")
            .map(|s| parse_date(s))
            .transpose()?,
        due_day: sub.get_one::<u32>("due_day").copied(),
    };
    let created = store.add_obligation(kind, &draft)?;
    println!("{} '{}' added (id {})", kind.label(), created.name, created.id);
    Ok(())
}

fn list<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    kind: ObligationKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_arg(sub)?;
    let items = store.obligations(kind)?;
    let classified = classify(store.ledger(), kind, &items, month, today());

    let data: Vec<_> = classified
        .iter()
        .map(|c| {
            json!({
                "id": c.item.id,
                "name": c.item.name,
                "amount": c.item.amount,
                "due": c.due,
                "due_date": c.due_date,
                "paid": c.paid,
                "status": c.status,
            })
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }

    let rows = classified
        .iter()
        .map(|c| {
            vec![
                c.item.id.clone(),
                c.item.name.clone(),
                fmt_money(&c.due),
                c.due_date.to_string(),
                c.status.label().to_string(),
            ]
        })
        .collect();
    println!("{} for {}", kind.label(), month);
    println!(
        "{}",
        pretty_table(&["ID", "Name", "Due", "Due date", "Status"], rows)
    );
    Ok(())
}

fn pay<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    kind: ObligationKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let month = month_arg(sub)?;
    if !store.obligations(kind)?.iter().any(|o| &o.id == id) {
        anyhow::bail!("No {} with id {}", kind.label().to_lowercase(), id);
    }
    let paid = store.toggle_paid(kind.payment_kind(), id, month)?;
    let state = if paid { "paid" } else { "unpaid" };
    println!("{} {} marked {} for {}", kind.label(), id, state, month);
    Ok(())
}
