// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Shared step-state table.
//!
//! One entry per live step, readable by other processes on the node. Every
//! mutation happens through an [`EntryGuard`], which holds that key's lock
//! until dropped.

mod entry;
mod file;
mod memory;
mod table;

pub use entry::StepEntry;
pub use file::FileStepTable;
pub use memory::MemoryStepTable;
pub use table::{EntryGuard, StepTable, TableError};

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
