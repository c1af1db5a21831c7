//! Parallel glob traversal
//!
//! This module implements the traversal engine behind a glob query.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      GlobVisitor                         │
//! │  - stats the base, queues one root task per pattern     │
//! │  - each task lists/stats and queues further tasks       │
//! │  - matched paths land in a shared result set            │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │ enqueue
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                     WorkAccountant                       │
//! │  - pending/total counters around every task             │
//! │  - error slots ordered by severity, first writer wins   │
//! │  - fires the completion channel exactly once when the   │
//! │    pending count returns to zero                        │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │ execute
//!                             ▼
//!                caller-supplied Executor
//!                (or inline on the caller's thread)
//! ```
//!
//! Tasks enqueue more tasks from within themselves, so completion is
//! decided by the pending counter alone, never by executor quiescence.

pub(crate) mod accountant;
pub(crate) mod glob;

pub(crate) use accountant::{Completion, WorkAccountant};
pub(crate) use glob::{DirFilter, GlobVisitor};
