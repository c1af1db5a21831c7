//! Single-segment wildcard matching
//!
//! Matches one filename against one pattern segment, where `*` matches any
//! run of characters, `?` matches a single character, and a filename with a
//! leading `.` is only matched by a pattern that spells the dot out.
//!
//! Common shapes (`*`, `*SUFFIX`, `PREFIX*`) are answered with string
//! comparisons; everything else is translated to an anchored regex, compiled
//! once per query and cached.

use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;

/// Per-query cache of compiled segment regexes.
///
/// Shared across worker tasks; concurrent insertion safe. `regex::Regex`
/// clones share the compiled program, so handing copies out of the lock is
/// cheap.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<String, Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_compile(&self, pattern: &str) -> Regex {
        let mut map = self.compiled.lock();
        match map.get(pattern) {
            Some(regex) => regex.clone(),
            None => {
                let regex = compile_wildcard(pattern);
                map.insert(pattern.to_string(), regex.clone());
                regex
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.compiled.lock().len()
    }
}

/// Returns whether `name` matches the glob segment `pattern`.
///
/// A `cache` of compiled regexes may be supplied to speed up repeated
/// matches against the same segment.
pub fn matches(pattern: &str, name: &str, cache: Option<&PatternCache>) -> bool {
    if pattern.is_empty() || name.is_empty() {
        return false;
    }

    // Common case: **. The recursive marker matches hidden entries too, so
    // it shortcuts ahead of the dot rule.
    if pattern == "**" {
        return true;
    }

    // If a filename starts with '.', this char must be matched explicitly.
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }

    // Common case: *
    if pattern == "*" {
        return true;
    }

    // Common case: *.xyz
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !suffix.contains('*') && !suffix.contains('?') {
            return name.ends_with(suffix);
        }
    }

    // Common case: xyz*
    if let Some(prefix) = pattern.strip_suffix('*') {
        if !prefix.contains('*') && !prefix.contains('?') {
            return name.starts_with(prefix);
        }
    }

    let regex = match cache {
        Some(cache) => cache.get_or_compile(pattern),
        None => compile_wildcard(pattern),
    };
    regex.is_match(name)
}

/// Compile a wildcard segment into an anchored regex.
///
/// e.g. `foo*bar?.java` -> `^foo.*bar.\.java$`
fn compile_wildcard(pattern: &str) -> Regex {
    let translated = format!("^{}$", translate(pattern));
    match Regex::new(&translated) {
        Ok(regex) => regex,
        // Validation does not reject every character the regex dialect
        // objects to (an unbalanced '(' for instance). The task wrapper
        // turns this panic into a runtime-fault report.
        Err(err) => panic!(
            "wildcard segment '{}' produced invalid regex '{}': {}",
            pattern, translated, err
        ),
    }
}

/// Translate a wildcard segment to regex source.
///
/// `*` becomes `.*`, `?` becomes `.`, regex metacharacters are escaped. A
/// `**` is translated as `.*` with an adjacent `/` consumed; segments are
/// supposed to be `**` alone, but the substitution keeps whole-pattern
/// inputs behaving.
fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut regexp = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' => {
                let mut skip = 0;
                if chars.get(i + 1) == Some(&'*') {
                    // '**' matches zero or more components, not one or more:
                    // swallow the second '*' and the separator beside it.
                    skip = 1;
                    if chars.get(i + 2) == Some(&'/') {
                        // '**/' -- skip the '/'.
                        skip = 2;
                    } else if i + 2 == chars.len() && i > 0 && chars[i - 1] == '/' {
                        // '/**' at the end -- drop the '/' already emitted.
                        regexp.pop();
                    }
                }
                regexp.push_str(".*");
                i += skip;
            }
            '?' => regexp.push('.'),
            '^' | '$' | '|' | '+' | '{' | '}' | '[' | ']' | '\\' | '.' => {
                regexp.push('\\');
                regexp.push(c);
            }
            _ => regexp.push(c),
        }
        i += 1;
    }
    regexp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, name: &str) -> bool {
        matches(pattern, name, None)
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!m("", "file"));
        assert!(!m("*", ""));
        assert!(!m("", ""));
    }

    #[test]
    fn test_star_and_double_star_match_everything() {
        assert!(m("*", "file.txt"));
        assert!(m("**", "file.txt"));
        // The recursive marker alone matches hidden entries as well.
        assert!(m("**", ".hidden"));
    }

    #[test]
    fn test_hidden_files_need_explicit_dot() {
        assert!(!m("*", ".hidden"));
        assert!(!m("*.txt", ".secret.txt"));
        assert!(!m("?hidden", ".hidden"));
        assert!(m(".*", ".hidden"));
        assert!(m(".h*", ".hidden"));
    }

    #[test]
    fn test_suffix_fast_path() {
        assert!(m("*.java", "Foo.java"));
        assert!(!m("*.java", "Foo.jar"));
        // '?' in the remainder must not take the literal fast path
        assert!(m("*a?c", "xxabc"));
        assert!(!m("*a?c", "xxa?d"));
    }

    #[test]
    fn test_prefix_fast_path() {
        assert!(m("foo*", "foobar"));
        assert!(!m("foo*", "fobar"));
        assert!(m("fo?bar*", "foXbarYY"));
    }

    #[test]
    fn test_general_wildcards() {
        assert!(m("foo*bar?.java", "fooXXbarY.java"));
        assert!(!m("foo*bar?.java", "fooXXbarYY.java"));
        assert!(m("a?c", "abc"));
        assert!(!m("a?c", "ac"));
        assert!(m("*x*y*", "axbyc"));
        assert!(!m("*x*y*", "aybxc"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert!(m("a.b", "a.b"));
        assert!(!m("a.b", "aXb"));
        assert!(m("x+y", "x+y"));
        assert!(m("v[1]", "v[1]"));
        assert!(m("a{b}c", "a{b}c"));
        assert!(m("do$lar", "do$lar"));
        assert!(!m("x+y", "xxy"));
    }

    #[test]
    fn test_match_is_anchored() {
        assert!(!m("b?d", "abcde"));
        assert!(!m("abc", "abcd"));
        assert!(!m("bcd", "abcd"));
    }

    #[test]
    fn test_translate_basics() {
        assert_eq!(translate("foo*bar?.java"), "foo.*bar.\\.java");
        assert_eq!(translate("a[1]"), "a\\[1\\]");
    }

    #[test]
    fn test_translate_double_star_consumes_separator() {
        // Whole-pattern inputs are out of contract but must stay sane.
        assert_eq!(translate("**/foo"), ".*foo");
        assert_eq!(translate("a/**"), "a.*");
        assert_eq!(translate("**"), ".*");
        assert_eq!(translate("a/**/b"), "a/.*b");
    }

    #[test]
    fn test_cache_is_populated_and_reused() {
        let cache = PatternCache::new();
        assert!(matches("f?o*bar", "fooXbar", Some(&cache)));
        assert_eq!(cache.len(), 1);
        assert!(matches("f?o*bar", "fYoZbar", Some(&cache)));
        assert_eq!(cache.len(), 1);
        // Fast-path patterns never hit the cache
        assert!(matches("*.txt", "a.txt", Some(&cache)));
        assert_eq!(cache.len(), 1);
    }
}
