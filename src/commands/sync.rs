// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::config::Config;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::store::{DrainReport, ReconcilingStore};
use crate::utils::pretty_table;

pub fn print_report(report: &DrainReport) {
    if report.attempted() == 0 {
        return;
    }
    println!("Synced {} pending operation(s)", report.replayed);
    if report.dropped > 0 {
        println!(
            "{} operation(s) could not be synced and were discarded",
            report.dropped
        );
    }
}

pub fn sync<R: RemoteStore, L: LocalStore>(store: &mut ReconcilingStore<R, L>) -> Result<()> {
    if !store.is_online() {
        println!(
            "Offline: {} pending operation(s) kept until the remote is reachable",
            store.pending().len()
        );
        return Ok(());
    }
    let report = store.drain()?;
    if report.attempted() == 0 {
        println!("Nothing to sync");
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn status<R: RemoteStore, L: LocalStore>(store: &ReconcilingStore<R, L>, config: &Config) -> Result<()> {
    let mode = if store.is_online() { "online" } else { "offline" };
    let remote = config.remote_url.clone().unwrap_or_else(|| "(none)".into());
    println!(
        "{}",
        pretty_table(
            &["Remote", "Mode", "Pending"],
            vec![vec![remote, mode.into(), store.pending().len().to_string()]]
        )
    );
    if !store.pending().is_empty() {
        let rows = store
            .pending()
            .iter()
            .map(|op| {
                vec![
                    op.kind().to_string(),
                    op.collection().to_string(),
                    op.target_id().unwrap_or("-").to_string(),
                    chrono::DateTime::from_timestamp_millis(op.timestamp())
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Operation", "Collection", "ID", "Queued at"], rows)
        );
    }
    Ok(())
}
