// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::store::http::HttpRemote;
use crate::store::remote::{NoRemote, RemoteStore};

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Runtime options taken from global CLI flags and their environment fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub remote_url: Option<String>,
    pub offline: bool,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote_url: None,
            offline: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_matches(m: &clap::ArgMatches) -> Config {
        let remote_url = m
            .get_one::<String>("remote")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let secs = m
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Config {
            remote_url,
            offline: m.get_flag("offline"),
            timeout: Duration::from_secs(secs),
        }
    }

    /// Builds the remote collaborator and reports whether it is reachable now.
    pub fn connect(&self) -> Result<(Box<dyn RemoteStore>, bool)> {
        let Some(url) = &self.remote_url else {
            info!("no remote store configured, running local-only");
            return Ok((Box::new(NoRemote), false));
        };
        let remote = HttpRemote::new(url, self.timeout)?;
        let reachable = !self.offline && remote.probe();
        if !reachable {
            info!(url = remote.base_url(), "remote store not reachable, starting offline");
        }
        Ok((Box::new(remote), reachable))
    }
}
