// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local durable key-value storage and the per-collection JSON caches kept in it.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::{Collection, Document, doc_id};

/// String values addressed by fixed string keys.
pub trait LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

impl LocalStore for Connection {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let v: Option<String> = self
            .query_row(
                "SELECT value FROM local_items WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()
            .with_context(|| format!("Read local item '{}'", key))?;
        Ok(v)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.execute(
            "INSERT INTO local_items(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )
        .with_context(|| format!("Write local item '{}'", key))?;
        Ok(())
    }
}

/// Reads JSON stored under `key`. Missing or corrupt values yield `default()`.
pub fn read_json_or<T, L, F>(local: &L, key: &str, default: F) -> Result<T>
where
    T: DeserializeOwned,
    L: LocalStore + ?Sized,
    F: FnOnce() -> T,
{
    match local.get_item(key)? {
        None => Ok(default()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(v) => Ok(v),
            Err(err) => {
                warn!(key, %err, "corrupt local entry, falling back to default");
                Ok(default())
            }
        },
    }
}

pub fn write_json<T, L>(local: &L, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    L: LocalStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    local.set_item(key, &raw)
}

/// Every cached document of a collection. A single stored object counts as a
/// one-element collection; anything that is not an object is skipped.
pub fn cached_documents<L: LocalStore + ?Sized>(
    local: &L,
    collection: Collection,
) -> Result<Vec<Document>> {
    let stored: Value = read_json_or(local, collection.local_key(), || Value::Array(Vec::new()))?;
    let docs = match stored {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(doc) => Some(doc),
                _ => None,
            })
            .collect(),
        Value::Object(doc) => vec![doc],
        _ => Vec::new(),
    };
    Ok(docs)
}

pub fn read_locally<L: LocalStore + ?Sized>(
    local: &L,
    collection: Collection,
    id: &str,
) -> Result<Option<Document>> {
    Ok(cached_documents(local, collection)?
        .into_iter()
        .find(|d| doc_id(d) == Some(id)))
}

/// Upserts by id: replaces the cached document with the same id, else appends.
pub fn store_locally<L: LocalStore + ?Sized>(
    local: &L,
    collection: Collection,
    doc: &Document,
) -> Result<()> {
    store_all_locally(local, collection, std::slice::from_ref(doc))
}

pub fn store_all_locally<L: LocalStore + ?Sized>(
    local: &L,
    collection: Collection,
    docs: &[Document],
) -> Result<()> {
    let mut cached = cached_documents(local, collection)?;
    for doc in docs {
        let id = doc_id(doc);
        match cached.iter_mut().find(|c| id.is_some() && doc_id(c) == id) {
            Some(slot) => *slot = doc.clone(),
            None => cached.push(doc.clone()),
        }
    }
    write_json(local, collection.local_key(), &cached)
}

pub fn delete_locally<L: LocalStore + ?Sized>(
    local: &L,
    collection: Collection,
    id: &str,
) -> Result<()> {
    let mut cached = cached_documents(local, collection)?;
    cached.retain(|d| doc_id(d) != Some(id));
    write_json(local, collection.local_key(), &cached)
}
