//! Integration tests for glob-walker
//!
//! Each test builds a real directory tree under a tempdir and runs queries
//! against it, both inline (no executor) and on a thread pool, since the
//! engine promises identical results for every scheduling mode.

use glob_walker::{Executor, GlobBuilder, GlobError, GlobOutcome, Task, ThreadPoolExecutor};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};

/// Build a tree from relative paths; entries ending in '/' are directories.
fn build_tree(entries: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    for entry in entries {
        let path = dir.path().join(entry.trim_end_matches('/'));
        if entry.ends_with('/') {
            std::fs::create_dir_all(&path).unwrap();
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, b"").unwrap();
        }
    }
    dir
}

/// Run the same query inline and on a pool, assert the results agree, and
/// return them as base-relative strings.
fn glob_both(base: &Path, patterns: &[&str], exclude_directories: bool) -> BTreeSet<String> {
    let inline = run(base, patterns, exclude_directories, false);
    let pooled = run(base, patterns, exclude_directories, true);
    assert_eq!(inline, pooled, "inline and pooled runs disagree");
    inline
}

fn run(
    base: &Path,
    patterns: &[&str],
    exclude_directories: bool,
    pooled: bool,
) -> BTreeSet<String> {
    let mut builder = GlobBuilder::new(base)
        .add_patterns(patterns.iter().copied())
        .exclude_directories(exclude_directories);
    if pooled {
        builder = builder.executor(Arc::new(ThreadPoolExecutor::new(8)));
    }
    relative(base, builder.glob().unwrap())
}

fn relative(base: &Path, paths: Vec<PathBuf>) -> BTreeSet<String> {
    let count = paths.len();
    let set: BTreeSet<String> = paths
        .into_iter()
        .map(|p| {
            if p == base {
                ".".to_string()
            } else {
                p.strip_prefix(base)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            }
        })
        .collect();
    // The engine promises a duplicate-free result
    assert_eq!(set.len(), count, "duplicate paths in glob result");
    set
}

fn set(entries: &[&str]) -> BTreeSet<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

#[test]
fn star_matches_top_level_files_only() {
    let tree = build_tree(&["a.txt", "b.txt", "sub/c.txt"]);
    assert_eq!(
        glob_both(tree.path(), &["*.txt"], false),
        set(&["a.txt", "b.txt"])
    );
}

#[test]
fn recursive_prefix_descends_all_levels() {
    let tree = build_tree(&["a.txt", "b.txt", "sub/c.txt"]);
    assert_eq!(
        glob_both(tree.path(), &["**/*.txt"], false),
        set(&["a.txt", "b.txt", "sub/c.txt"])
    );
}

#[test]
fn double_recursion_reports_each_match_once() {
    let tree = build_tree(&["a/a/foo.txt"]);
    assert_eq!(
        glob_both(tree.path(), &["**/a/**/foo.txt"], false),
        set(&["a/a/foo.txt"])
    );
}

#[test]
fn literal_star_and_question_reach_nested_file() {
    let tree = build_tree(&["x/y/z"]);
    for pattern in ["x/y/z", "x/*/z", "x/?/z"] {
        assert_eq!(
            glob_both(tree.path(), &[pattern], false),
            set(&["x/y/z"]),
            "pattern {}",
            pattern
        );
    }
}

#[test]
fn hidden_files_require_explicit_dot() {
    let tree = build_tree(&[".hidden", "a"]);
    assert_eq!(glob_both(tree.path(), &["*"], false), set(&["a"]));
    assert_eq!(glob_both(tree.path(), &[".*"], false), set(&[".hidden"]));
}

#[test]
fn invalid_pattern_fails_the_query() {
    let tree = build_tree(&["a"]);
    let result = GlobBuilder::new(tree.path()).add_pattern("a//b").glob();
    match result {
        Err(GlobError::Pattern { pattern, .. }) => assert_eq!(pattern, "a//b"),
        other => panic!("expected pattern error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn bare_recursive_matches_everything_reachable() {
    let tree = build_tree(&["a.txt", "sub/c.txt", "sub/deep/d.txt", ".dot/e.txt"]);
    assert_eq!(
        glob_both(tree.path(), &["**"], false),
        set(&[
            ".",
            ".dot",
            ".dot/e.txt",
            "a.txt",
            "sub",
            "sub/c.txt",
            "sub/deep",
            "sub/deep/d.txt",
        ])
    );
}

#[test]
fn trailing_recursive_includes_the_anchor_itself() {
    let tree = build_tree(&["a/one", "a/nested/two", "b/other"]);
    assert_eq!(
        glob_both(tree.path(), &["a/**"], false),
        set(&["a", "a/one", "a/nested", "a/nested/two"])
    );
}

#[test]
fn leading_recursive_matches_at_every_depth() {
    let tree = build_tree(&["y", "m/y", "m/n/y", "m/n/o/z"]);
    assert_eq!(
        glob_both(tree.path(), &["**/y"], false),
        set(&["y", "m/y", "m/n/y"])
    );
}

#[test]
fn exclude_directories_drops_matched_dirs() {
    let tree = build_tree(&["a/one", "a/nested/two"]);
    assert_eq!(
        glob_both(tree.path(), &["a/**"], true),
        set(&["a/one", "a/nested/two"])
    );
    // The invariant holds for every pattern shape
    let all = glob_both(tree.path(), &["**"], true);
    for entry in &all {
        assert!(
            !tree.path().join(entry).is_dir(),
            "directory {} leaked into excluded result",
            entry
        );
    }
}

#[test]
fn path_filter_prunes_whole_subtrees() {
    let tree = build_tree(&["keep/a.txt", "skip/b.txt", "skip/deep/c.txt"]);
    let matches = GlobBuilder::new(tree.path())
        .add_pattern("**/*.txt")
        .path_filter(|path: &Path| !path.ends_with("skip"))
        .glob()
        .unwrap();
    assert_eq!(relative(tree.path(), matches), set(&["keep/a.txt"]));
}

#[test]
fn empty_patterns_and_missing_base_are_empty() {
    let tree = build_tree(&["a"]);
    let none: [&str; 0] = [];
    assert!(glob_both(tree.path(), &none, false).is_empty());
    assert!(GlobBuilder::new("/no/such/base/anywhere")
        .add_pattern("**")
        .glob()
        .unwrap()
        .is_empty());
}

#[test]
fn union_of_single_pattern_queries_equals_combined_query() {
    let tree = build_tree(&["a.rs", "a.txt", "sub/b.rs", "sub/b.txt"]);
    let combined = glob_both(tree.path(), &["**/*.rs", "**/*.txt"], false);
    let mut union = glob_both(tree.path(), &["**/*.rs"], false);
    union.extend(glob_both(tree.path(), &["**/*.txt"], false));
    assert_eq!(combined, union);
}

#[test]
fn repeated_queries_are_idempotent() {
    let tree = build_tree(&["a.txt", "sub/c.txt", "sub/deep/d.txt"]);
    let first = glob_both(tree.path(), &["**/*.txt"], false);
    let second = glob_both(tree.path(), &["**/*.txt"], false);
    assert_eq!(first, second);
}

#[test]
fn overlapping_patterns_do_not_duplicate() {
    let tree = build_tree(&["a.txt"]);
    // relative() asserts the no-duplicates invariant internally
    assert_eq!(
        glob_both(tree.path(), &["*.txt", "a.*", "a.txt", "**/a.txt"], false),
        set(&["a.txt"])
    );
}

#[test]
fn base_as_regular_file_matches_nothing() {
    let tree = build_tree(&["plain"]);
    let matches = GlobBuilder::new(tree.path().join("plain"))
        .add_pattern("*")
        .glob()
        .unwrap();
    assert!(matches.is_empty());
}

#[cfg(unix)]
#[test]
fn symlinks_are_followed_and_dangling_links_skipped() {
    let tree = build_tree(&["target.txt", "realdir/inner.txt"]);
    std::os::unix::fs::symlink(
        tree.path().join("target.txt"),
        tree.path().join("link.txt"),
    )
    .unwrap();
    std::os::unix::fs::symlink(
        tree.path().join("no-such-target"),
        tree.path().join("dangling.txt"),
    )
    .unwrap();
    std::os::unix::fs::symlink(tree.path().join("realdir"), tree.path().join("dirlink")).unwrap();

    // The link itself is reported, under its own name
    assert_eq!(
        glob_both(tree.path(), &["*.txt"], false),
        set(&["link.txt", "target.txt"])
    );

    // Literal traversal through a directory symlink reaches the target
    assert_eq!(
        glob_both(tree.path(), &["dirlink/*.txt"], false),
        set(&["dirlink/inner.txt"])
    );
}

#[cfg(unix)]
#[test]
fn directly_named_fifo_is_reported_but_wildcards_skip_it() {
    let tree = build_tree(&["regular"]);
    let fifo = tree.path().join("pipe");
    let status = std::process::Command::new("mkfifo")
        .arg(&fifo)
        .status()
        .expect("mkfifo not available");
    assert!(status.success());

    // Named outright: the literal-resolve branch accepts "other" files
    assert_eq!(glob_both(tree.path(), &["pipe"], false), set(&["pipe"]));
    // Listed by a wildcard: special files never match
    assert_eq!(glob_both(tree.path(), &["*"], false), set(&["regular"]));
}

#[test]
fn panicking_path_filter_surfaces_as_task_panic() {
    let tree = build_tree(&["boom/a.txt"]);
    let result = GlobBuilder::new(tree.path())
        .add_pattern("**/*.txt")
        .path_filter(|path: &Path| {
            if path.ends_with("boom") {
                panic!("filter exploded");
            }
            true
        })
        .glob();
    match result {
        Err(GlobError::TaskPanic(message)) => assert!(message.contains("filter exploded")),
        other => panic!("expected task panic, got {:?}", other.map(|_| ())),
    }
}

/// Executor that parks every task until the test releases them, making
/// cancellation deterministic.
#[derive(Default)]
struct DeferredExecutor {
    parked: Mutex<Vec<Task>>,
}

impl DeferredExecutor {
    fn run_all(&self) {
        loop {
            let task = self.parked.lock().unwrap().pop();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl Executor for DeferredExecutor {
    fn execute(&self, task: Task) {
        self.parked.lock().unwrap().push(task);
    }
}

#[test]
fn cancel_before_tasks_run_reports_canceled() {
    let tree = build_tree(&["a.txt", "sub/b.txt"]);
    let executor = Arc::new(DeferredExecutor::default());
    let handle = GlobBuilder::new(tree.path())
        .add_pattern("**/*.txt")
        .executor(Arc::clone(&executor) as Arc<dyn Executor>)
        .glob_async()
        .unwrap();

    handle.cancel();
    executor.run_all();

    match handle.wait().unwrap() {
        GlobOutcome::Canceled => {}
        GlobOutcome::Matches(paths) => panic!("expected cancellation, got {:?}", paths),
    }
}

#[test]
fn deferred_executor_completes_normally_without_cancel() {
    let tree = build_tree(&["a.txt", "sub/b.txt"]);
    let executor = Arc::new(DeferredExecutor::default());
    let handle = GlobBuilder::new(tree.path())
        .add_pattern("**/*.txt")
        .executor(Arc::clone(&executor) as Arc<dyn Executor>)
        .glob_async()
        .unwrap();

    executor.run_all();

    match handle.wait().unwrap() {
        GlobOutcome::Matches(paths) => {
            assert_eq!(relative(tree.path(), paths), set(&["a.txt", "sub/b.txt"]));
        }
        GlobOutcome::Canceled => panic!("query was not canceled"),
    }
}
