// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod expenses;
pub mod exporter;
pub mod external;
pub mod importer;
pub mod obligations;
pub mod settings;
pub mod summary;
pub mod sync;
