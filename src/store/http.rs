// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! JSON-over-HTTP document store:
//!
//! - `POST   {base}/{collection}`            create, responds with the stored document
//! - `GET    {base}/{collection}`            list
//! - `GET    {base}/{collection}/{id}`       fetch, 404 when absent
//! - `PATCH  {base}/{collection}/{id}`       merge update
//! - `PUT    {base}/{collection}/{id}?merge` upsert
//! - `DELETE {base}/{collection}/{id}`

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::debug;

use super::remote::{RemoteError, RemoteStore};
use super::{Collection, Document};
use crate::utils::http_client;

pub struct HttpRemote {
    client: Client,
    base: Url,
}

impl HttpRemote {
    pub fn new(base_url: &str, timeout: Duration) -> Result<HttpRemote> {
        let base = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid remote URL '{}'", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Remote URL '{}' cannot carry a path", base_url);
        }
        Ok(HttpRemote {
            client: http_client(timeout)?,
            base,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Whether the store answers at all. Used as the connectivity signal at startup.
    pub fn probe(&self) -> bool {
        match self.client.get(self.base.clone()).send() {
            Ok(resp) => !resp.status().is_server_error(),
            Err(err) => {
                debug!(%err, base = %self.base, "remote probe failed");
                false
            }
        }
    }

    /// `{base}/{collection}[/{id}]`, each segment percent-encoded.
    pub fn url(&self, collection: Collection, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(collection.name());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

fn check(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().unwrap_or_default();
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

impl RemoteStore for HttpRemote {
    fn create_document(&self, collection: Collection, data: &Document) -> Result<Document, RemoteError> {
        let resp = self.client.post(self.url(collection, None)).json(data).send()?;
        let doc: Document = check(resp)?.json()?;
        if !doc.contains_key("id") {
            return Err(RemoteError::Malformed(format!(
                "created {} document carries no id",
                collection
            )));
        }
        Ok(doc)
    }

    fn get_document(&self, collection: Collection, id: &str) -> Result<Option<Document>, RemoteError> {
        let resp = self.client.get(self.url(collection, Some(id))).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: Document = check(resp)?.json()?;
        Ok(Some(doc))
    }

    fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        let resp = self.client.get(self.url(collection, None)).send()?;
        let docs: Vec<Document> = check(resp)?.json()?;
        Ok(docs)
    }

    fn update_document(&self, collection: Collection, id: &str, data: &Document) -> Result<(), RemoteError> {
        let resp = self
            .client
            .patch(self.url(collection, Some(id)))
            .json(data)
            .send()?;
        check(resp)?;
        Ok(())
    }

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        let resp = self.client.delete(self.url(collection, Some(id))).send()?;
        // already gone is as good as deleted
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(resp)?;
        Ok(())
    }

    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Document,
        merge: bool,
    ) -> Result<(), RemoteError> {
        let resp = self
            .client
            .put(self.url(collection, Some(id)))
            .query(&[("merge", merge.to_string())])
            .json(data)
            .send()?;
        check(resp)?;
        Ok(())
    }
}
