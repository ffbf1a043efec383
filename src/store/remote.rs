// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use super::{Collection, Document};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote store unreachable: {0}")]
    Unreachable(String),
    #[error("remote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response from remote store: {0}")]
    Malformed(String),
    #[error("remote request failed: {0}")]
    Http(#[source] reqwest::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            RemoteError::Unreachable(err.to_string())
        } else if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else {
            RemoteError::Http(err)
        }
    }
}

/// Document store of record, addressed by collection name and document id.
///
/// Documents are JSON objects; the id travels in the `id` field of returned
/// documents.
pub trait RemoteStore {
    /// Stores a new document and returns it with its store-assigned `id`.
    fn create_document(&self, collection: Collection, data: &Document) -> Result<Document, RemoteError>;

    fn get_document(&self, collection: Collection, id: &str) -> Result<Option<Document>, RemoteError>;

    fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, RemoteError>;

    /// Merges `data` into an existing document.
    fn update_document(&self, collection: Collection, id: &str, data: &Document) -> Result<(), RemoteError>;

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), RemoteError>;

    /// Upsert under a caller-chosen id; with `merge` the fields are merged
    /// into any existing document instead of replacing it.
    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Document,
        merge: bool,
    ) -> Result<(), RemoteError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn create_document(&self, collection: Collection, data: &Document) -> Result<Document, RemoteError> {
        (**self).create_document(collection, data)
    }

    fn get_document(&self, collection: Collection, id: &str) -> Result<Option<Document>, RemoteError> {
        (**self).get_document(collection, id)
    }

    fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        (**self).list_documents(collection)
    }

    fn update_document(&self, collection: Collection, id: &str, data: &Document) -> Result<(), RemoteError> {
        (**self).update_document(collection, id, data)
    }

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        (**self).delete_document(collection, id)
    }

    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Document,
        merge: bool,
    ) -> Result<(), RemoteError> {
        (**self).set_document(collection, id, data, merge)
    }
}

/// Stand-in used when no remote store is configured. Every call fails as
/// unreachable, so the reconciling store stays on its local path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemote;

impl NoRemote {
    fn unreachable<T>() -> Result<T, RemoteError> {
        Err(RemoteError::Unreachable("no remote store configured".into()))
    }
}

impl RemoteStore for NoRemote {
    fn create_document(&self, _: Collection, _: &Document) -> Result<Document, RemoteError> {
        Self::unreachable()
    }

    fn get_document(&self, _: Collection, _: &str) -> Result<Option<Document>, RemoteError> {
        Self::unreachable()
    }

    fn list_documents(&self, _: Collection) -> Result<Vec<Document>, RemoteError> {
        Self::unreachable()
    }

    fn update_document(&self, _: Collection, _: &str, _: &Document) -> Result<(), RemoteError> {
        Self::unreachable()
    }

    fn delete_document(&self, _: Collection, _: &str) -> Result<(), RemoteError> {
        Self::unreachable()
    }

    fn set_document(&self, _: Collection, _: &str, _: &Document, _: bool) -> Result<(), RemoteError> {
        Self::unreachable()
    }
}
