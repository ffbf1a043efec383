// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use pocketbook::config::Config;
use pocketbook::models::ObligationKind;
use pocketbook::store::ReconcilingStore;
use pocketbook::{cli, commands, db};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let matches = cli::build_cli().get_matches();
    let config = Config::from_matches(&matches);

    let conn = db::open_or_init()?;
    let (remote, reachable) = config.connect()?;
    let mut store = ReconcilingStore::open(remote, conn)?;
    if let Some(report) = store.set_online(reachable)? {
        commands::sync::print_report(&report);
    }

    match matches.subcommand() {
        Some(("settings", sub)) => commands::settings::handle(&mut store, sub)?,
        Some(("inst", sub)) => {
            commands::obligations::handle(&mut store, ObligationKind::Installment, sub)?
        }
        Some(("bill", sub)) => commands::obligations::handle(&mut store, ObligationKind::Bill, sub)?,
        Some(("exp", sub)) => commands::expenses::handle(&mut store, sub)?,
        Some(("ext", sub)) => commands::external::handle(&mut store, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut store, sub)?,
        Some(("summary", sub)) => commands::summary::summary(&mut store, sub)?,
        Some(("compare", sub)) => commands::summary::compare(&mut store, sub)?,
        Some(("alerts", _)) => commands::summary::alerts(&mut store)?,
        Some(("sync", _)) => commands::sync::sync(&mut store)?,
        Some(("status", _)) => commands::sync::status(&store, &config)?,
        Some(("export", sub)) => commands::exporter::handle(&mut store, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
