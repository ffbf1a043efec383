// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Paid/unpaid flags per (kind, item, month). Absent means unpaid.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::store::local::{LocalStore, read_json_or, write_json};
use crate::temporal::Month;

pub const PAID_KEY: &str = "pf_paid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Installment,
    Bill,
    External,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentKind::Installment => "installment",
            PaymentKind::Bill => "bill",
            PaymentKind::External => "external",
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn payment_key(kind: PaymentKind, id: &str, month: Month) -> String {
    format!("{}:{}:{}", kind, id, month)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentLedger {
    paid: BTreeMap<String, bool>,
}

impl PaymentLedger {
    pub fn load<L: LocalStore + ?Sized>(local: &L) -> Result<PaymentLedger> {
        let paid = read_json_or(local, PAID_KEY, BTreeMap::new)?;
        Ok(PaymentLedger { paid })
    }

    pub fn is_paid(&self, kind: PaymentKind, id: &str, month: Month) -> bool {
        self.paid
            .get(&payment_key(kind, id, month))
            .copied()
            .unwrap_or(false)
    }

    /// Upserts the flag and writes the whole map through to local storage.
    /// Entries are never removed; keys of deleted items simply go unread.
    pub fn set_paid<L: LocalStore + ?Sized>(
        &mut self,
        local: &L,
        kind: PaymentKind,
        id: &str,
        month: Month,
        paid: bool,
    ) -> Result<()> {
        self.paid.insert(payment_key(kind, id, month), paid);
        write_json(local, PAID_KEY, &self.paid)
    }

    /// Swaps in a whole map, as when restoring a backup.
    pub fn replace<L: LocalStore + ?Sized>(
        &mut self,
        local: &L,
        entries: BTreeMap<String, bool>,
    ) -> Result<()> {
        self.paid = entries;
        write_json(local, PAID_KEY, &self.paid)
    }

    pub fn entries(&self) -> &BTreeMap<String, bool> {
        &self.paid
    }
}
