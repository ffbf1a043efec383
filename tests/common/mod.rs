// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;

use pocketbook::db;
use pocketbook::models::Obligation;
use pocketbook::store::remote::{RemoteError, RemoteStore};
use pocketbook::store::{Collection, Document, ReconcilingStore};

pub fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn obligation(id: &str, name: &str, amount: &str, start: NaiveDate) -> Obligation {
    Obligation {
        id: id.to_string(),
        name: name.to_string(),
        amount: dec(amount),
        start,
        end: None,
        due_day: None,
        is_local: false,
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub docs: HashMap<Collection, Vec<Document>>,
    pub fail: bool,
    pub next_id: u32,
    /// `"{op} {collection}[/{id}]"` for every call that reached the store.
    pub calls: Vec<String>,
}

/// In-memory remote store. Clones share state so a test can keep a handle
/// after moving one into the reconciling store.
#[derive(Debug, Clone, Default)]
pub struct FakeRemote {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.state.borrow_mut().fail = fail;
    }

    pub fn docs(&self, collection: Collection) -> Vec<Document> {
        self.state
            .borrow()
            .docs
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn seed(&self, collection: Collection, doc: Value) {
        let Value::Object(doc) = doc else {
            panic!("seed expects an object");
        };
        self.state
            .borrow_mut()
            .docs
            .entry(collection)
            .or_default()
            .push(doc);
    }

    fn record(&self, call: String) -> Result<(), RemoteError> {
        let mut st = self.state.borrow_mut();
        if st.fail {
            return Err(RemoteError::Unreachable("fake outage".into()));
        }
        st.calls.push(call);
        Ok(())
    }
}

fn id_of(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

impl RemoteStore for FakeRemote {
    fn create_document(&self, collection: Collection, data: &Document) -> Result<Document, RemoteError> {
        self.record(format!("create {}", collection))?;
        let mut st = self.state.borrow_mut();
        st.next_id += 1;
        let mut doc = data.clone();
        doc.insert("id".into(), Value::String(format!("doc-{}", st.next_id)));
        st.docs.entry(collection).or_default().push(doc.clone());
        Ok(doc)
    }

    fn get_document(&self, collection: Collection, id: &str) -> Result<Option<Document>, RemoteError> {
        self.record(format!("get {}/{}", collection, id))?;
        Ok(self
            .docs(collection)
            .into_iter()
            .find(|d| id_of(d) == Some(id)))
    }

    fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        self.record(format!("list {}", collection))?;
        Ok(self.docs(collection))
    }

    fn update_document(&self, collection: Collection, id: &str, data: &Document) -> Result<(), RemoteError> {
        self.record(format!("update {}/{}", collection, id))?;
        let mut st = self.state.borrow_mut();
        let docs = st.docs.entry(collection).or_default();
        let Some(doc) = docs.iter_mut().find(|d| id_of(d) == Some(id)) else {
            return Err(RemoteError::Rejected {
                status: 404,
                message: format!("no document {}", id),
            });
        };
        for (k, v) in data {
            doc.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        self.record(format!("delete {}/{}", collection, id))?;
        let mut st = self.state.borrow_mut();
        st.docs
            .entry(collection)
            .or_default()
            .retain(|d| id_of(d) != Some(id));
        Ok(())
    }

    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Document,
        merge: bool,
    ) -> Result<(), RemoteError> {
        self.record(format!("set {}/{}", collection, id))?;
        let mut st = self.state.borrow_mut();
        let docs = st.docs.entry(collection).or_default();
        let mut fresh = data.clone();
        fresh.insert("id".into(), Value::String(id.to_string()));
        match docs.iter_mut().find(|d| id_of(d) == Some(id)) {
            Some(doc) if merge => {
                for (k, v) in fresh {
                    doc.insert(k, v);
                }
            }
            Some(doc) => *doc = fresh,
            None => docs.push(fresh),
        }
        Ok(())
    }
}

/// A store over an in-memory database, already online against `remote`.
pub fn online_store(remote: &FakeRemote) -> ReconcilingStore<FakeRemote, Connection> {
    let mut store = ReconcilingStore::open(remote.clone(), setup()).unwrap();
    store.set_online(true).unwrap();
    store
}

pub fn offline_store(remote: &FakeRemote) -> ReconcilingStore<FakeRemote, Connection> {
    ReconcilingStore::open(remote.clone(), setup()).unwrap()
}
