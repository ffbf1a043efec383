// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{Value, json};

use crate::commands::expenses::search_expenses;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::store::{Collection, ReconcilingStore};
use crate::utils::month_arg;

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(store, sub),
        Some(("backup", sub)) => export_backup(store, sub),
        _ => Ok(()),
    }
}

fn export_expenses<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let month = month_arg(sub)?;
    let items = store.expenses(Some(month))?;
    let items = search_expenses(items, sub.get_one::<String>("search").map(String::as_str))?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create export file {}", out))?;
            wtr.write_record(["date", "category", "note", "method", "amount"])?;
            for e in &items {
                wtr.write_record([
                    e.date.to_string(),
                    e.category.clone(),
                    e.note.clone(),
                    e.method.to_string(),
                    e.amount.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let rows: Vec<Value> = items
                .iter()
                .map(|e| {
                    json!({
                        "date": e.date, "category": e.category, "note": e.note,
                        "method": e.method, "amount": e.amount
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write export file {}", out))?;
        }
        _ => {
            anyhow::bail!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported {} expense(s) for {} to {}", items.len(), month, out);
    Ok(())
}

/// Full snapshot: settings, every collection, and the paid ledger.
pub fn backup_document<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
) -> Result<Value> {
    let settings = store.settings()?;
    let mut collections = serde_json::Map::new();
    for collection in Collection::ALL {
        if collection == Collection::Settings {
            continue;
        }
        let docs: Vec<Value> = store
            .read_all(collection)?
            .into_iter()
            .map(Value::Object)
            .collect();
        collections.insert(collection.name().to_string(), Value::Array(docs));
    }
    Ok(json!({
        "exportedAt": Utc::now().to_rfc3339(),
        "settings": settings,
        "collections": collections,
        "paid": store.ledger().entries(),
    }))
}

fn export_backup<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap();
    let doc = backup_document(store)?;
    std::fs::write(out, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("Write backup file {}", out))?;
    println!("Backup written to {}", out);
    Ok(())
}
