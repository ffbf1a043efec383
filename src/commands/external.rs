// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::NewExternalExpense;
use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::utils::{fmt_money, maybe_print_json, month_arg, parse_date, parse_decimal, pretty_table};

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let draft = NewExternalExpense {
                date: parse_date(sub.get_one::<String>("date").unwrap())?,
                category: sub.get_one::<String>("category").unwrap().trim().to_string(),
                note: sub.get_one::<String>("note").cloned().unwrap_or_default(),
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                paid: sub.get_flag("paid"),
            };
            let created = store.add_external_expense(&draft)?;
            println!(
                "Added external expense {} on {}: {}",
                created.id,
                created.date,
                fmt_money(&created.amount)
            );
        }
        Some(("list", sub)) => {
            let month = month_arg(sub)?;
            let items = store.external_expenses(Some(month))?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                return Ok(());
            }
            let rows = items
                .iter()
                .map(|e| {
                    vec![
                        e.id.clone(),
                        e.date.to_string(),
                        e.category.clone(),
                        e.note.clone(),
                        fmt_money(&e.amount),
                        if e.paid { "yes" } else { "no" }.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["ID", "Date", "Category", "Note", "Amount", "Paid"], rows)
            );
        }
        Some(("toggle", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            match store.toggle_external_paid(id)? {
                Some(true) => println!("External expense {} marked paid", id),
                Some(false) => println!("External expense {} marked unpaid", id),
                None => anyhow::bail!("No external expense with id {}", id),
            }
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store.delete_external_expense(id)?;
            println!("External expense {} removed", id);
        }
        _ => {}
    }
    Ok(())
}
