//! Query configuration and the public entry points
//!
//! A query is configured through [`GlobBuilder`] and launched either
//! blocking ([`GlobBuilder::glob`]) or detached
//! ([`GlobBuilder::glob_async`], returning a [`GlobHandle`] that can be
//! canceled or waited on).

use crate::error::{GlobError, Result};
use crate::executor::Executor;
use crate::fs::{Filesystem, OsFilesystem};
use crate::pattern;
use crate::visitor::{Completion, DirFilter, GlobVisitor, WorkAccountant};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::Arc;

/// How a query ended when no error occurred.
#[derive(Debug)]
pub enum GlobOutcome {
    /// The matched paths, in no particular order and with no duplicates.
    Matches(Vec<PathBuf>),
    /// The query was canceled before completing; no paths are reported.
    Canceled,
}

/// Configures and launches a glob query.
///
/// # Example
///
/// ```no_run
/// use glob_walker::GlobBuilder;
///
/// let matches = GlobBuilder::new("/repo/pkg")
///     .add_patterns(["src/**/*.rs", "BUILD"])
///     .exclude_directories(true)
///     .glob()
///     .unwrap();
/// ```
pub struct GlobBuilder {
    base: PathBuf,
    patterns: Vec<String>,
    exclude_directories: bool,
    dir_filter: Option<Arc<DirFilter>>,
    filesystem: Arc<dyn Filesystem>,
    executor: Option<Arc<dyn Executor>>,
}

impl GlobBuilder {
    /// Create a builder rooted at `base`. The base should be an absolute
    /// path; matched paths are reported under it.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            patterns: Vec::new(),
            exclude_directories: false,
            dir_filter: None,
            filesystem: Arc::new(OsFilesystem),
            executor: None,
        }
    }

    /// Add one include pattern.
    pub fn add_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add include patterns. An empty pattern set yields an empty result.
    pub fn add_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// If set to true, directories are not returned in the glob result.
    pub fn exclude_directories(mut self, exclude: bool) -> Self {
        self.exclude_directories = exclude;
        self
    }

    /// Prune subtrees: directories for which `filter` returns false are not
    /// descended into and none of their contents are reported.
    pub fn path_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&std::path::Path) -> bool + Send + Sync + 'static,
    {
        self.dir_filter = Some(Arc::new(filter));
        self
    }

    /// Swap the filesystem backend. Defaults to [`OsFilesystem`].
    pub fn filesystem(mut self, filesystem: Arc<dyn Filesystem>) -> Self {
        self.filesystem = filesystem;
        self
    }

    /// Set the executor for parallel evaluation. If unset, every task runs
    /// synchronously on the calling thread.
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Launch the query and return a handle to it.
    ///
    /// Pattern validation happens here, before any filesystem access; an
    /// invalid pattern fails the whole query.
    pub fn glob_async(self) -> Result<GlobHandle> {
        let split_patterns = pattern::check_and_split(self.patterns.iter().map(String::as_str))?;

        let (accountant, done_rx) = WorkAccountant::new(self.executor);
        let visitor = GlobVisitor::new(self.filesystem, self.dir_filter, Arc::clone(&accountant));
        visitor.launch(self.base, split_patterns, self.exclude_directories);

        Ok(GlobHandle {
            accountant,
            visitor,
            done_rx,
        })
    }

    /// Run the query to completion and return the matched paths.
    ///
    /// The wait is uninterruptible: the call returns only once traversal
    /// has fully drained (or failed).
    pub fn glob(self) -> Result<Vec<PathBuf>> {
        match self.glob_async()?.wait()? {
            GlobOutcome::Matches(paths) => Ok(paths),
            // Unreachable through this entry point: cancellation requires
            // the handle, which was never exposed.
            GlobOutcome::Canceled => Err(GlobError::Canceled),
        }
    }
}

/// A launched query. Dropping the handle without waiting abandons the
/// results but does not stop traversal bookkeeping.
pub struct GlobHandle {
    accountant: Arc<WorkAccountant>,
    visitor: Arc<GlobVisitor>,
    done_rx: Receiver<Completion>,
}

impl GlobHandle {
    /// Request cancellation. Best-effort: tasks already executing finish
    /// their bookkeeping, queued tasks short-circuit, and [`wait`] reports
    /// [`GlobOutcome::Canceled`]. In-progress I/O is not interrupted.
    ///
    /// [`wait`]: Self::wait
    pub fn cancel(&self) {
        self.accountant.cancel();
    }

    /// Block until the query completes and return its outcome.
    pub fn wait(self) -> Result<GlobOutcome> {
        match self.done_rx.recv() {
            Ok(Completion::Finished) => Ok(GlobOutcome::Matches(self.visitor.take_results())),
            Ok(Completion::Failed(err)) => Err(err),
            Ok(Completion::Canceled) => Ok(GlobOutcome::Canceled),
            // The sender lives in the accountant we hold; disconnection
            // without a message means the engine lost track of its work.
            Err(_) => Err(GlobError::Engine(
                "completion channel closed before the query finished".into(),
            )),
        }
    }
}
