//! Changed-digit highlight sets.
//!
//! Indices refer to characters of the canonical formatted string (see
//! [`crate::format`]), including separators and the decimal point.

use std::collections::BTreeSet;

use crate::format::DECIMAL_POINT;

/// How changed digits are detected during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightPolicy {
    /// Compare the start string with every interpolated frame and keep
    /// every digit position that ever differed, for the whole transition.
    #[default]
    Accumulate,
    /// Highlight from the first digit where start and target differ through
    /// the end of the target string, computed once per transition.
    FromFirstDivergence,
}

/// Set of highlighted character indices.
///
/// A decimal point is never marked on its own account: [`HighlightSet::mask`]
/// derives its highlight from the digit right after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    indices: BTreeSet<usize>,
}

impl HighlightSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an index. Returns true if it was not present.
    pub fn insert(&mut self, index: usize) -> bool {
        self.indices.insert(index)
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Lowest highlighted index.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    /// Per-character display mask for `text`.
    ///
    /// A decimal point is marked only when the first digit after it is.
    #[must_use]
    pub fn mask(&self, text: &str) -> Vec<bool> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                if c == DECIMAL_POINT {
                    self.contains(i + 1)
                } else {
                    self.contains(i)
                }
            })
            .collect()
    }
}

impl FromIterator<usize> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

impl Extend<usize> for HighlightSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.indices.extend(iter);
    }
}

/// Digit positions where `start` and `frame` differ.
///
/// A position counts when either string has a digit there; positions past
/// the end of the shorter string compare against nothing.
pub fn changed_digits<'a>(start: &'a str, frame: &'a str) -> impl Iterator<Item = usize> + 'a {
    let a: Vec<char> = start.chars().collect();
    let b: Vec<char> = frame.chars().collect();
    let len = a.len().max(b.len());
    (0..len).filter(move |&i| {
        let x = a.get(i).copied();
        let y = b.get(i).copied();
        let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
        (is_digit(x) || is_digit(y)) && x != y
    })
}

/// Everything from the first differing digit to the end of `target`,
/// excluding the decimal point.
#[must_use]
pub fn from_first_divergence(start: &str, target: &str) -> HighlightSet {
    let Some(first) = changed_digits(start, target).next() else {
        return HighlightSet::new();
    };
    target
        .chars()
        .enumerate()
        .skip(first)
        .filter(|&(_, c)| c != DECIMAL_POINT)
        .map(|(i, _)| i)
        .collect()
}
