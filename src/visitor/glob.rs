//! Recursive glob traversal
//!
//! One `GlobVisitor` exists per query. It stats the base, queues a root
//! task per pattern, and from inside each task queues further tasks for
//! directory recursion and symlink resolution. The recursion is, expressed
//! functionally:
//!
//! ```text
//! glob base []     = { base }
//! glob base (x:xs) = union { glob child xs | child matches "base/x" }
//! ```
//!
//! with `**` additionally continuing at the same segment when entering a
//! subdirectory, and matching zero components by skipping straight to the
//! next segment.

use crate::fs::Filesystem;
use crate::pattern;
use crate::visitor::WorkAccountant;
use crate::wildcard::{self, PatternCache};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Caller-supplied predicate over directory paths; returning false prunes
/// the subtree.
pub(crate) type DirFilter = dyn Fn(&Path) -> bool + Send + Sync;

/// A `(directory, pattern-index)` traversal state, used to suppress
/// duplicate subtasks under patterns with multiple recursive segments.
#[derive(Debug, PartialEq, Eq, Hash)]
struct GlobTask {
    base: PathBuf,
    pattern_idx: usize,
}

/// Concurrent set of visited traversal states.
///
/// A naive treatment of `**` reaches the same `(directory, index)` state
/// via multiple routes when a pattern holds two recursive segments; for
/// example `**/a/**/foo.txt` over the single file `a/a/foo.txt` descends
/// both by consuming the leading `**` against `a` and by matching `a`
/// directly. Only the first claim of a state proceeds.
#[derive(Debug, Default)]
struct SubtaskDedup {
    visited: Mutex<HashSet<GlobTask>>,
}

impl SubtaskDedup {
    fn claim(&self, base: &Path, pattern_idx: usize) -> bool {
        self.visited.lock().insert(GlobTask {
            base: base.to_path_buf(),
            pattern_idx,
        })
    }
}

/// The per-pattern traversal context shared by all of one pattern's tasks.
struct GlobTaskContext {
    segments: Vec<String>,
    exclude_directories: bool,
    /// Present only for patterns with more than one `**` segment; single-
    /// recursion visitation is already unique.
    dedup: Option<SubtaskDedup>,
}

/// Executes one glob query using parallelism, which matters when the query
/// needs many directory listings on a high-latency filesystem.
pub(crate) struct GlobVisitor {
    fs: Arc<dyn Filesystem>,
    dir_filter: Option<Arc<DirFilter>>,
    accountant: Arc<WorkAccountant>,

    // Shared across worker tasks; insert-only for the query's lifetime.
    results: Mutex<HashSet<PathBuf>>,
    cache: PatternCache,
}

impl GlobVisitor {
    pub(crate) fn new(
        fs: Arc<dyn Filesystem>,
        dir_filter: Option<Arc<DirFilter>>,
        accountant: Arc<WorkAccountant>,
    ) -> Arc<Self> {
        Arc::new(Self {
            fs,
            dir_filter,
            accountant,
            results: Mutex::new(HashSet::new()),
            cache: PatternCache::new(),
        })
    }

    /// Stat the base and queue one root task per pattern.
    ///
    /// The whole dispatch loop is bracketed by a pending-count hold so that
    /// completion cannot fire while roots are still being queued, even if
    /// early tasks finish immediately.
    pub(crate) fn launch(
        self: &Arc<Self>,
        base: PathBuf,
        split_patterns: Vec<Vec<String>>,
        exclude_directories: bool,
    ) {
        self.accountant.begin_dispatch();
        match self.fs.stat(&base) {
            Err(err) => self.accountant.record_io(err),
            Ok(None) => debug!("glob base {} does not exist", base.display()),
            Ok(Some(attrs)) => {
                debug!(
                    "glob dispatch: base={}, {} patterns",
                    base.display(),
                    split_patterns.len()
                );
                for segments in split_patterns {
                    let recursive_segments = segments
                        .iter()
                        .filter(|segment| pattern::is_recursive(segment))
                        .count();
                    let context = Arc::new(GlobTaskContext {
                        dedup: (recursive_segments > 1).then(SubtaskDedup::default),
                        segments,
                        exclude_directories,
                    });
                    self.queue_glob(base.clone(), attrs.is_directory, 0, &context);
                }
            }
        }
        self.accountant.finish_dispatch();
    }

    /// Extract the matched paths. Call only after completion has fired; no
    /// task inserts afterwards.
    pub(crate) fn take_results(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.results.lock()).into_iter().collect()
    }

    fn queue_glob(
        self: &Arc<Self>,
        base: PathBuf,
        base_is_dir: bool,
        idx: usize,
        context: &Arc<GlobTaskContext>,
    ) {
        if let Some(dedup) = &context.dedup {
            if !dedup.claim(&base, idx) {
                return;
            }
        }
        let visitor = Arc::clone(self);
        let context = Arc::clone(context);
        self.accountant.enqueue(Box::new(move || {
            if let Err(err) = visitor.really_glob(&base, base_is_dir, idx, &context) {
                visitor.accountant.record_io(err);
            }
        }));
    }

    /// Match `segments[idx..]` against the tree under `base`.
    fn really_glob(
        self: &Arc<Self>,
        base: &Path,
        base_is_dir: bool,
        idx: usize,
        context: &Arc<GlobTaskContext>,
    ) -> io::Result<()> {
        if base_is_dir {
            if let Some(filter) = &self.dir_filter {
                if !filter(base) {
                    return Ok(());
                }
            }
        }

        if idx == context.segments.len() {
            // Base case: the whole pattern is consumed.
            if !(context.exclude_directories && base_is_dir) {
                self.results.lock().insert(base.to_path_buf());
            }
            return Ok(());
        }

        if !base_is_dir {
            // Nothing to find here.
            return Ok(());
        }

        let segment = context.segments[idx].as_str();

        // ** is special: it can match nothing at all. x/** matches x,
        // **/y matches y, and x/**/y matches x/y.
        if pattern::is_recursive(segment) {
            self.queue_glob(base.to_path_buf(), base_is_dir, idx + 1, context);
        }

        if !segment.contains('*') && !segment.contains('?') {
            // Literal segment: a stat is enough, no directory listing.
            let child = base.join(segment);
            let attrs = match self.fs.stat(&child)? {
                Some(attrs) => attrs,
                // Dangling symlink, missing entry, etc.
                None => return Ok(()),
            };
            if !attrs.is_directory && !(attrs.is_regular_file || attrs.is_other) {
                return Ok(());
            }
            self.queue_glob(child, attrs.is_directory, idx + 1, context);
            return Ok(());
        }

        for child in self.fs.list(base)? {
            let attrs = self.fs.read_attributes(&child)?;
            if attrs.is_other {
                // Special file (fifo, socket, device): never matched from a
                // listing.
                continue;
            }
            let name = match child.file_name().and_then(|name| name.to_str()) {
                Some(name) => name,
                // Patterns are strings; a non-UTF-8 name cannot match one.
                None => continue,
            };
            if wildcard::matches(segment, name, Some(&self.cache)) {
                if attrs.is_symlink {
                    self.process_symlink(child, idx, context);
                } else {
                    self.process_file_or_directory(child, attrs.is_directory, idx, context);
                }
            }
        }
        Ok(())
    }

    /// Resolve a matched symlink in its own task.
    ///
    /// Stat'ing links inline while holding the directory listing would
    /// serialize target resolution; on a networked filesystem a directory
    /// full of symlinks then resolves one round-trip at a time. Links whose
    /// target cannot be stat'ed are skipped silently.
    fn process_symlink(self: &Arc<Self>, path: PathBuf, idx: usize, context: &Arc<GlobTaskContext>) {
        let visitor = Arc::clone(self);
        let context = Arc::clone(context);
        self.accountant.enqueue(Box::new(move || {
            if let Ok(Some(attrs)) = visitor.fs.stat(&path) {
                visitor.process_file_or_directory(path, attrs.is_directory, idx, &context);
            }
        }));
    }

    fn process_file_or_directory(
        self: &Arc<Self>,
        path: PathBuf,
        is_dir: bool,
        idx: usize,
        context: &Arc<GlobTaskContext>,
    ) {
        let recursive = pattern::is_recursive(&context.segments[idx]);
        if is_dir {
            // A recursive segment stays at the same index when descending.
            self.queue_glob(path, true, idx + usize::from(!recursive), context);
        } else if idx + 1 == context.segments.len() {
            self.results.lock().insert(path);
        }
        // A non-directory cannot consume further segments; drop it.
    }
}
