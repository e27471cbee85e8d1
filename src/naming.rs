//! Child channel naming and recognition.
//!
//! A [`NamingPolicy`] couples a pure formatting function with a regular
//! expression that accepts exactly the names the function can produce. The
//! same pair is used both to name new children and to recognize surviving
//! children when rebuilding the registry after a restart.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

type FormatFn = dyn Fn(&str, u32) -> String + Send + Sync;

/// A (format, pattern) pair for one channel kind.
#[derive(Clone)]
pub struct NamingPolicy {
    format: Arc<FormatFn>,
    pattern: Regex,
}

impl NamingPolicy {
    /// Build a policy from a formatting function and its matching pattern.
    ///
    /// `format` must be deterministic, and `pattern` must accept every name
    /// `format` can produce while rejecting unrelated channel names.
    pub fn new<F>(format: F, pattern: Regex) -> Self
    where
        F: Fn(&str, u32) -> String + Send + Sync + 'static,
    {
        Self { format: Arc::new(format), pattern }
    }

    /// The default voice policy: `[DRoom #{count}] {name}`.
    pub fn default_voice() -> Self {
        Self::new(
            |name, count| format!("[DRoom #{count}] {name}"),
            Regex::new(r"^\[DRoom #\d+\]\s+.+").expect("hard-coded pattern"),
        )
    }

    /// The default text policy: `droom-{count}_{name}`.
    pub fn default_text() -> Self {
        Self::new(
            |name, count| format!("droom-{count}_{name}"),
            Regex::new(r"^droom-\d+_").expect("hard-coded pattern"),
        )
    }

    /// Render the display name for a child with the given 1-based counter.
    pub fn format(&self, base: &str, count: u32) -> String {
        (self.format)(base, count)
    }

    /// Whether `name` looks like a name this policy produced.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

impl fmt::Debug for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingPolicy").field("pattern", &self.pattern.as_str()).finish()
    }
}

/// First run of digits in a rendered child name, i.e. its sequence counter.
pub(crate) fn parse_sequence(name: &str) -> Option<u32> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String =
        name[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Counter for the next child, given the rendered names of the live ones.
///
/// This is `max(parsed sequence) + 1`, not `len + 1`: deleting a child in the
/// middle of the sequence must not make a later creation collide with a
/// surviving name.
pub(crate) fn next_count<'a>(names: impl Iterator<Item = &'a str>) -> u32 {
    names.filter_map(parse_sequence).max().unwrap_or(0) + 1
}
