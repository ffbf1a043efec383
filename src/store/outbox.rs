// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::local::{LocalStore, read_json_or, write_json};
use super::{Collection, Document};

pub const OUTBOX_KEY: &str = "pf_outbox";

/// A remote write captured while the remote store was unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PendingOperation {
    Create {
        collection: Collection,
        data: Document,
        timestamp: i64,
    },
    Update {
        collection: Collection,
        id: String,
        data: Document,
        timestamp: i64,
    },
    Delete {
        collection: Collection,
        id: String,
        timestamp: i64,
    },
    /// Upsert under a caller-chosen id.
    Set {
        collection: Collection,
        id: String,
        data: Document,
        merge: bool,
        timestamp: i64,
    },
}

impl PendingOperation {
    pub fn kind(&self) -> &'static str {
        match self {
            PendingOperation::Create { .. } => "create",
            PendingOperation::Update { .. } => "update",
            PendingOperation::Delete { .. } => "delete",
            PendingOperation::Set { .. } => "set",
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            PendingOperation::Create { collection, .. }
            | PendingOperation::Update { collection, .. }
            | PendingOperation::Delete { collection, .. }
            | PendingOperation::Set { collection, .. } => *collection,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match self {
            PendingOperation::Create { .. } => None,
            PendingOperation::Update { id, .. }
            | PendingOperation::Delete { id, .. }
            | PendingOperation::Set { id, .. } => Some(id),
        }
    }

    /// Enqueue time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        match self {
            PendingOperation::Create { timestamp, .. }
            | PendingOperation::Update { timestamp, .. }
            | PendingOperation::Delete { timestamp, .. }
            | PendingOperation::Set { timestamp, .. } => *timestamp,
        }
    }
}

/// Enqueue-ordered pending operations, written through to local storage so
/// they survive a restart.
#[derive(Debug, Default)]
pub struct Outbox {
    ops: Vec<PendingOperation>,
}

impl Outbox {
    pub fn load<L: LocalStore + ?Sized>(local: &L) -> Result<Outbox> {
        let ops = read_json_or(local, OUTBOX_KEY, Vec::new)?;
        Ok(Outbox { ops })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn as_slice(&self) -> &[PendingOperation] {
        &self.ops
    }

    pub fn enqueue<L: LocalStore + ?Sized>(&mut self, local: &L, op: PendingOperation) -> Result<()> {
        self.ops.push(op);
        write_json(local, OUTBOX_KEY, &self.ops)
    }

    /// Removes and returns every queued operation. Anything enqueued after
    /// this call belongs to the next drain.
    pub fn take<L: LocalStore + ?Sized>(&mut self, local: &L) -> Result<Vec<PendingOperation>> {
        write_json(local, OUTBOX_KEY, &[] as &[PendingOperation])?;
        Ok(std::mem::take(&mut self.ops))
    }
}
