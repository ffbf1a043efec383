// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::Settings;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::store::{Collection, Document, ReconcilingStore};

pub fn handle<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("backup", sub)) => {
            let path = sub.get_one::<String>("in").unwrap();
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Read backup file {}", path))?;
            let backup: Value = serde_json::from_str(&raw)
                .with_context(|| format!("Backup file {} is not valid JSON", path))?;
            let report = restore_backup(store, &backup)?;
            println!(
                "Restored {} record(s) across {} collection(s), {} payment flag(s)",
                report.records, report.collections, report.payments
            );
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub settings: bool,
    pub collections: usize,
    pub records: usize,
    pub payments: usize,
}

/// Writes a backup document back into the store. Sections missing from the
/// backup are left alone; present ones replace what is cached locally.
pub fn restore_backup<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    backup: &Value,
) -> Result<RestoreReport> {
    let Some(root) = backup.as_object() else {
        anyhow::bail!("Backup must be a JSON object");
    };
    let mut report = RestoreReport::default();

    if let Some(settings) = root.get("settings") {
        let settings: Settings = serde_json::from_value(settings.clone())
            .context("Backup settings could not be read")?;
        store.save_settings(&settings)?;
        report.settings = true;
    }

    if let Some(collections) = root.get("collections").and_then(Value::as_object) {
        for (name, docs) in collections {
            let Some(collection) = Collection::ALL
                .into_iter()
                .find(|c| c.name() == name && *c != Collection::Settings)
            else {
                warn!(name = %name, "skipping unknown collection in backup");
                continue;
            };
            let Some(items) = docs.as_array() else {
                warn!(%collection, "skipping collection that is not a list");
                continue;
            };
            let docs: Vec<Document> = items
                .iter()
                .filter_map(|v| v.as_object().cloned())
                .collect();
            store.restore_local(collection, &docs)?;
            report.collections += 1;
            report.records += docs.len();
        }
    }

    if let Some(paid) = root.get("paid") {
        let entries: BTreeMap<String, bool> = serde_json::from_value(paid.clone())
            .context("Backup payment flags could not be read")?;
        report.payments = entries.len();
        store.restore_ledger(entries)?;
    }
    Ok(report)
}
