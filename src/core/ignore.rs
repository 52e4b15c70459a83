//! Path exclusion rules: ignore patterns for the filtering phase and
//! explicitly ignored paths for rendering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Patterns applied to every run unless disabled in the configuration.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules/",
    ".git/",
    "__pycache__/",
    ".vscode/",
    "dist/",
    "build/",
    ".next/",
    "coverage/",
    ".nyc_output/",
    ".idea/",
    "target/",
    "bin/",
    "obj/",
    ".vs/",
    ".venv/",
    ".gitignore",
    "eslint.config.js",
    "package-lock.json",
    "package.json",
];

/// An ordered, de-duplicated list of ignore patterns.
///
/// A path is ignored when it contains any pattern as a case-insensitive
/// substring. Exact matches and `pattern + "/"` prefixes are special cases
/// of that rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
    lowered: Vec<String>,
}

impl IgnorePatterns {
    /// Builds the list from the defaults (optionally) followed by `custom`.
    pub fn new<I, S>(custom: I, include_defaults: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        if include_defaults {
            for pattern in DEFAULT_IGNORE_PATTERNS {
                list.push(pattern);
            }
        }
        for pattern in custom {
            list.push(pattern.as_ref());
        }
        list
    }

    /// The default pattern list only.
    pub fn defaults() -> Self {
        Self::new(std::iter::empty::<&str>(), true)
    }

    /// Appends a pattern. Blank lines and `#` comments are skipped, as are
    /// patterns already present. Returns whether the pattern was added.
    pub fn push(&mut self, pattern: &str) -> bool {
        let trimmed = pattern.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        if self.patterns.iter().any(|p| p == trimmed) {
            return false;
        }
        self.patterns.push(trimmed.to_string());
        self.lowered.push(trimmed.to_lowercase());
        true
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the first pattern matching `path`, if any.
    pub fn matched_by(&self, path: &str) -> Option<&str> {
        let path = path.to_lowercase();
        self.lowered
            .iter()
            .position(|pattern| path.contains(pattern.as_str()))
            .map(|idx| self.patterns[idx].as_str())
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.matched_by(path).is_some()
    }
}

/// Paths the user excluded from a rendered tree.
///
/// A path is excluded if it is in the set, or if one of its ancestors is in
/// the set and that ancestor contains no `.`. The dot check is a heuristic
/// for "this entry is a directory", so an extension-less ignored file also
/// hides anything nested under the same prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredPaths {
    paths: BTreeSet<String>,
}

impl IgnoredPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    /// Flips the ignored state of `path` and returns the new state.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        if self.paths.contains(path) {
            return true;
        }
        self.paths.iter().any(|ignored| {
            !ignored.contains('.')
                && path
                    .strip_prefix(ignored.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
