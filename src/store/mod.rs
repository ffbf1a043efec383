// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dual-write data access: the remote document store is the store of record,
//! local storage mirrors it for offline use, and writes made while the remote
//! is unreachable wait in the outbox until connectivity returns.
//!
//! Remote failures never reach callers. A failed remote call is logged and the
//! operation completes against local storage; only local storage errors are
//! returned.

pub mod collections;
pub mod http;
pub mod local;
pub mod outbox;
pub mod remote;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::ledger::PaymentLedger;
use local::{LocalStore, delete_locally, read_locally, store_all_locally, store_locally};
use outbox::{Outbox, PendingOperation};
use remote::{RemoteError, RemoteStore};

pub type Document = serde_json::Map<String, Value>;

/// Prefix of ids minted locally for records the remote store has not seen.
pub const TEMP_ID_PREFIX: &str = "temp_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Settings,
    Installments,
    Bills,
    Expenses,
    External,
    Budgets,
    Payments,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Settings,
        Collection::Installments,
        Collection::Bills,
        Collection::Expenses,
        Collection::External,
        Collection::Budgets,
        Collection::Payments,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Settings => "settings",
            Collection::Installments => "installments",
            Collection::Bills => "bills",
            Collection::Expenses => "expenses",
            Collection::External => "external",
            Collection::Budgets => "budgets",
            Collection::Payments => "payments",
        }
    }

    /// Local storage key of the collection's cached documents.
    pub fn local_key(self) -> &'static str {
        match self {
            Collection::Settings => "pf_settings",
            Collection::Installments => "pf_inst",
            Collection::Bills => "pf_bills",
            Collection::Expenses => "pf_exps",
            Collection::External => "pf_one",
            Collection::Budgets => "pf_budgets",
            Collection::Payments => "pf_payments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(doc) => Ok(doc),
        other => anyhow::bail!("Expected a JSON object, got {}", other),
    }
}

/// The fields sent to the remote store: everything but local bookkeeping.
fn payload(mut data: Document) -> Document {
    data.remove("id");
    data.remove("isLocal");
    data
}

fn stamped(mut data: Document, created: bool) -> Document {
    let now = Value::String(Utc::now().to_rfc3339());
    if created {
        data.insert("createdAt".into(), now.clone());
    }
    data.insert("updatedAt".into(), now);
    data
}

fn with_id(mut doc: Document, id: &str) -> Document {
    doc.insert("id".into(), Value::String(id.to_string()));
    doc
}

/// Outcome of replaying the outbox.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub replayed: usize,
    pub dropped: usize,
}

impl DrainReport {
    pub fn attempted(&self) -> usize {
        self.replayed + self.dropped
    }
}

pub struct ReconcilingStore<R, L> {
    remote: R,
    local: L,
    online: bool,
    outbox: Outbox,
    ledger: PaymentLedger,
    temp_seq: u64,
}

impl<R: RemoteStore, L: LocalStore> ReconcilingStore<R, L> {
    /// Opens the store offline; call [`set_online`](Self::set_online) once
    /// connectivity is known.
    pub fn open(remote: R, local: L) -> Result<Self> {
        let outbox = Outbox::load(&local)?;
        let ledger = PaymentLedger::load(&local)?;
        if !outbox.is_empty() {
            debug!(pending = outbox.len(), "outbox restored from local storage");
        }
        Ok(ReconcilingStore {
            remote,
            local,
            online: false,
            outbox,
            ledger,
            temp_seq: 0,
        })
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    pub fn pending(&self) -> &[PendingOperation] {
        self.outbox.as_slice()
    }

    /// Connectivity signal. Becoming reachable drains the outbox; the report
    /// is returned so the caller can tell the user.
    pub fn set_online(&mut self, online: bool) -> Result<Option<DrainReport>> {
        let was_online = self.online;
        self.online = online;
        match (was_online, online) {
            (false, true) => {
                info!("remote store reachable");
                self.drain().map(Some)
            }
            (true, false) => {
                info!("remote store unreachable, queueing writes");
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Replays every queued operation in enqueue order. A failed replay is
    /// logged and dropped; the queue is empty afterwards either way.
    pub fn drain(&mut self) -> Result<DrainReport> {
        let mut report = DrainReport::default();
        if !self.online || self.outbox.is_empty() {
            return Ok(report);
        }
        let ops = self.outbox.take(&self.local)?;
        info!(count = ops.len(), "syncing pending operations");
        for op in &ops {
            match self.replay(op) {
                Ok(()) => report.replayed += 1,
                Err(err) => {
                    warn!(
                        kind = op.kind(),
                        collection = %op.collection(),
                        id = op.target_id().unwrap_or("-"),
                        %err,
                        "dropping pending operation that failed to sync"
                    );
                    report.dropped += 1;
                }
            }
        }
        Ok(report)
    }

    fn replay(&self, op: &PendingOperation) -> Result<(), RemoteError> {
        match op {
            PendingOperation::Create {
                collection, data, ..
            } => self
                .remote
                .create_document(*collection, &stamped(data.clone(), true))
                .map(|_| ()),
            PendingOperation::Update {
                collection,
                id,
                data,
                ..
            } => self
                .remote
                .update_document(*collection, id, &stamped(data.clone(), false)),
            PendingOperation::Delete { collection, id, .. } => {
                self.remote.delete_document(*collection, id)
            }
            PendingOperation::Set {
                collection,
                id,
                data,
                merge,
                ..
            } => self
                .remote
                .set_document(*collection, id, &stamped(data.clone(), false), *merge),
        }
    }

    fn enqueue(&mut self, op: PendingOperation) -> Result<()> {
        debug!(kind = op.kind(), collection = %op.collection(), "queued for sync");
        self.outbox.enqueue(&self.local, op)
    }

    fn temp_id(&mut self) -> String {
        self.temp_seq += 1;
        format!(
            "{}{}_{}",
            TEMP_ID_PREFIX,
            Utc::now().timestamp_millis(),
            self.temp_seq
        )
    }

    fn local_record(&mut self, data: Document) -> Document {
        let id = self.temp_id();
        let mut record = with_id(data, &id);
        record.insert("isLocal".into(), Value::Bool(true));
        record
    }

    /// The cached document for `id` overlaid with `data`.
    fn merged_local(&self, collection: Collection, id: &str, data: &Document) -> Result<Document> {
        let mut record = read_locally(&self.local, collection, id)?.unwrap_or_default();
        for (k, v) in data {
            record.insert(k.clone(), v.clone());
        }
        Ok(with_id(record, id))
    }

    pub fn create(&mut self, collection: Collection, data: Document) -> Result<Document> {
        let data = payload(data);
        if !self.online {
            let record = self.local_record(data.clone());
            store_locally(&self.local, collection, &record)?;
            self.enqueue(PendingOperation::Create {
                collection,
                data,
                timestamp: Utc::now().timestamp_millis(),
            })?;
            return Ok(record);
        }

        match self.remote.create_document(collection, &stamped(data.clone(), true)) {
            Ok(created) => {
                store_locally(&self.local, collection, &created)?;
                Ok(created)
            }
            Err(err) => {
                warn!(%collection, %err, "remote create failed, keeping record locally");
                let record = self.local_record(data);
                store_locally(&self.local, collection, &record)?;
                Ok(record)
            }
        }
    }

    pub fn read_one(&mut self, collection: Collection, id: &str) -> Result<Option<Document>> {
        if !self.online {
            return read_locally(&self.local, collection, id);
        }
        match self.remote.get_document(collection, id) {
            Ok(Some(doc)) => {
                let doc = with_id(doc, id);
                store_locally(&self.local, collection, &doc)?;
                Ok(Some(doc))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                warn!(%collection, id, %err, "remote read failed, serving cached copy");
                read_locally(&self.local, collection, id)
            }
        }
    }

    pub fn read_all(&mut self, collection: Collection) -> Result<Vec<Document>> {
        if !self.online {
            return local::cached_documents(&self.local, collection);
        }
        match self.remote.list_documents(collection) {
            Ok(docs) => {
                store_all_locally(&self.local, collection, &docs)?;
                Ok(docs)
            }
            Err(err) => {
                warn!(%collection, %err, "remote list failed, serving cached copy");
                local::cached_documents(&self.local, collection)
            }
        }
    }

    pub fn update(&mut self, collection: Collection, id: &str, data: Document) -> Result<Document> {
        let data = payload(data);
        let record = self.merged_local(collection, id, &data)?;
        if !self.online {
            store_locally(&self.local, collection, &record)?;
            self.enqueue(PendingOperation::Update {
                collection,
                id: id.to_string(),
                data,
                timestamp: Utc::now().timestamp_millis(),
            })?;
            return Ok(record);
        }

        if let Err(err) = self
            .remote
            .update_document(collection, id, &stamped(data, false))
        {
            warn!(%collection, id, %err, "remote update failed, applied locally only");
        }
        store_locally(&self.local, collection, &record)?;
        Ok(record)
    }

    /// Removes the record locally no matter what the remote store says.
    pub fn delete(&mut self, collection: Collection, id: &str) -> Result<()> {
        if !self.online {
            delete_locally(&self.local, collection, id)?;
            return self.enqueue(PendingOperation::Delete {
                collection,
                id: id.to_string(),
                timestamp: Utc::now().timestamp_millis(),
            });
        }

        if let Err(err) = self.remote.delete_document(collection, id) {
            warn!(%collection, id, %err, "remote delete failed, removed locally only");
        }
        delete_locally(&self.local, collection, id)
    }

    /// Replaces the cached documents of a collection without touching the
    /// remote store.
    pub fn restore_local(&mut self, collection: Collection, docs: &[Document]) -> Result<()> {
        local::write_json(&self.local, collection.local_key(), docs)
    }

    pub fn restore_ledger(&mut self, entries: BTreeMap<String, bool>) -> Result<()> {
        self.ledger.replace(&self.local, entries)
    }

    /// Upsert under a fixed id, for singletons and composite-key records.
    pub fn set(
        &mut self,
        collection: Collection,
        id: &str,
        data: Document,
        merge: bool,
    ) -> Result<Document> {
        let data = payload(data);
        let record = if merge {
            self.merged_local(collection, id, &data)?
        } else {
            with_id(data.clone(), id)
        };
        if !self.online {
            store_locally(&self.local, collection, &record)?;
            self.enqueue(PendingOperation::Set {
                collection,
                id: id.to_string(),
                data,
                merge,
                timestamp: Utc::now().timestamp_millis(),
            })?;
            return Ok(record);
        }

        if let Err(err) = self
            .remote
            .set_document(collection, id, &stamped(data, false), merge)
        {
            warn!(%collection, id, %err, "remote set failed, applied locally only");
        }
        store_locally(&self.local, collection, &record)?;
        Ok(record)
    }
}
