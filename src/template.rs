//! Named tokens and `:name` substitution.
//!
//! Format strings reference values by a leading colon followed by one or more word
//! characters, e.g. `":title |:progress_bar| :percent_complete%"`. Substitution replaces
//! every reference that has a value in the [`Tokens`] map and leaves every other
//! reference untouched, so literal text such as `"10:30"` or an unknown `:name`
//! survives verbatim.

use std::{fmt::Display, sync::LazyLock};

use compact_str::{CompactString, format_compact};
use indexmap::IndexMap;
use regex::{Captures, Regex};

/// Names of the tokens every render provides.
pub mod builtin {
    /// The configured title.
    pub const TITLE: &str = "title";
    /// Integer percentage, truncated.
    pub const PERCENT_COMPLETE: &str = "percent_complete";
    /// The bar itself, exactly `bar_width` characters.
    pub const PROGRESS_BAR: &str = "progress_bar";
    /// Steps completed so far.
    pub const STEP: &str = "step";
    /// Steps still to go.
    pub const STEPS_REMAINING: &str = "steps_remaining";
    /// The total step count.
    pub const TOTAL_STEPS: &str = "total_steps";
    /// Seconds since start, two decimals (`"1.23s"`).
    pub const TIME_ELAPSED: &str = "time_elapsed";
    /// Estimated seconds to completion, two decimals.
    pub const TIME_REMAINING: &str = "time_remaining";

    /// All built-in names in the order they are produced.
    pub const ALL: [&str; 8] = [
        TITLE,
        PERCENT_COMPLETE,
        PROGRESS_BAR,
        STEP,
        STEPS_REMAINING,
        TOTAL_STEPS,
        TIME_ELAPSED,
        TIME_REMAINING,
    ];
}

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\w+)").expect("token pattern is a valid regex"));

/// An insertion-ordered map from token name to its display value.
///
/// Values are formatted once, when inserted, so any [`Display`] type can be supplied.
/// Inserting an existing name overwrites its value but keeps its original position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tokens(IndexMap<CompactString, CompactString>);

impl Tokens {
    /// Creates an empty token map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<CompactString>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name` to the formatted `value`, returning the previous value if any.
    pub fn insert(
        &mut self,
        name: impl Into<CompactString>,
        value: impl Display,
    ) -> Option<CompactString> {
        self.0.insert(name.into(), format_compact!("{value}"))
    }

    /// Returns the value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(CompactString::as_str)
    }

    /// Overlays `other` onto `self`; entries in `other` win on collision.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Tokens
where
    K: Into<CompactString>,
    V: Display,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tokens = Self::new();
        tokens.extend(iter);
        tokens
    }
}

impl<K, V> Extend<(K, V)> for Tokens
where
    K: Into<CompactString>,
    V: Display,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// Replaces every `:name` in `template` that has a value in `tokens`.
///
/// References without a value are left as they are.
///
/// ```
/// use step_progress::{Tokens, substitute};
///
/// let tokens = Tokens::new().with("done", 3).with("total", 10);
/// assert_eq!(substitute(":done/:total at :eta", &tokens), "3/10 at :eta");
/// ```
#[must_use]
pub fn substitute(template: &str, tokens: &Tokens) -> String {
    TOKEN_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            tokens
                .get(&caps[1])
                .map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}
