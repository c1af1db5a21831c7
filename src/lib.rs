//! glob-walker - Parallel UNIX-Style Glob Engine
//!
//! A filesystem-scanning backend for build-system package loading: given a
//! base directory and a set of include patterns, return every path under
//! the base whose relative path matches at least one pattern.
//!
//! # Features
//!
//! - **Restricted glob dialect**: `*` and `?` wildcards plus a recursive
//!   `**` segment that matches zero or more directory components. No
//!   bracket classes, no brace expansion, no negation.
//!
//! - **Parallel traversal**: tasks are dispatched to a caller-supplied
//!   executor and enqueue further tasks from within themselves, so a query
//!   that fans out across thousands of subdirectories can keep a
//!   high-latency (possibly networked) filesystem saturated.
//!
//! - **Exactly-once completion**: an atomic pending-task counter decides
//!   when the query is done; errors are aggregated by severity across
//!   workers and cancellation is a first-class outcome.
//!
//! - **Subtask deduplication**: patterns with more than one `**` segment
//!   reach the same traversal state via multiple routes; a concurrent
//!   visited set collapses them without losing results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        GlobBuilder                            │
//! │   base + patterns + options ──► validate ──► launch           │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        GlobVisitor                            │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐       ┌─────────┐     │
//! │  │ task    │  │ task    │  │ task    │  ...  │ task    │     │
//! │  │ stat/   │  │ readdir │  │ symlink │       │ readdir │     │
//! │  │ match   │  │ + match │  │ resolve │       │ + match │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘       └────┬────┘     │
//! │       │            │            │                 │          │
//! │       └────────────┴─────┬──────┴─────────────────┘          │
//! │                          ▼                                   │
//! │               WorkAccountant (pending/total,                 │
//! │               error slots, completion channel)               │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ execute
//!                                ▼
//!                  Executor (caller-supplied pool,
//!                  or inline on the calling thread)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use glob_walker::{GlobBuilder, ThreadPoolExecutor};
//! use std::sync::Arc;
//!
//! let executor = Arc::new(ThreadPoolExecutor::new(16));
//! let sources = GlobBuilder::new("/repo/pkg")
//!     .add_patterns(["src/**/*.rs", "tests/*.rs"])
//!     .exclude_directories(true)
//!     .executor(executor)
//!     .glob()
//!     .unwrap();
//! for path in sources {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! Matches are reported in an unspecified order. Hidden files (leading
//! `.`) are only matched by patterns that spell the dot out.

pub mod builder;
pub mod error;
pub mod executor;
pub mod fs;
pub mod pattern;
pub mod wildcard;

mod visitor;

pub use builder::{GlobBuilder, GlobHandle, GlobOutcome};
pub use error::{GlobError, PatternError, Result};
pub use executor::{Executor, Task, ThreadPoolExecutor};
pub use fs::{FileAttributes, Filesystem, OsFilesystem};
pub use wildcard::PatternCache;
