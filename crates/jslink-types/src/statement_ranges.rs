//! Statement-boundary bookkeeping for generated JavaScript.
//!
//! A [`StatementRanges`] lists the half-open byte spans `[start, end)` of the
//! top-level statements of one program text, in increasing order and without
//! overlap. Fragments compiled independently are packed together with
//! [`StatementRanges::combine`] (or incrementally with
//! [`StatementRangesBuilder`]) and a fragment's share of a combined program is
//! recovered with [`StatementRanges::extract`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a pair of offset lists does not describe valid statement ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("{starts} statement starts but {ends} statement ends")]
    LengthMismatch { starts: usize, ends: usize },

    #[error("statement {index} is empty or reversed: [{start}, {end})")]
    EmptyStatement {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("statement {index} ends at {end}, after the next statement starts at {next_start}")]
    Overlap {
        index: usize,
        end: usize,
        next_start: usize,
    },
}

/// Top-level statement spans of one JavaScript text.
///
/// Invariant: `starts.len() == ends.len()` and for every `i`,
/// `starts[i] < ends[i] <= starts[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRanges")]
pub struct StatementRanges {
    starts: Vec<usize>,
    ends: Vec<usize>,
}

#[derive(Deserialize)]
struct RawRanges {
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl TryFrom<RawRanges> for StatementRanges {
    type Error = RangeError;

    fn try_from(raw: RawRanges) -> Result<Self, Self::Error> {
        Self::new(raw.starts, raw.ends)
    }
}

impl StatementRanges {
    /// Validate and wrap a pair of offset lists.
    pub fn new(starts: Vec<usize>, ends: Vec<usize>) -> Result<Self, RangeError> {
        if starts.len() != ends.len() {
            return Err(RangeError::LengthMismatch {
                starts: starts.len(),
                ends: ends.len(),
            });
        }
        for index in 0..starts.len() {
            let (start, end) = (starts[index], ends[index]);
            if start >= end {
                return Err(RangeError::EmptyStatement { index, start, end });
            }
            if let Some(&next_start) = starts.get(index + 1) {
                if end > next_start {
                    return Err(RangeError::Overlap {
                        index,
                        end,
                        next_start,
                    });
                }
            }
        }
        Ok(Self { starts, ends })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn num_statements(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Start offset of statement `i`. Panics if `i` is out of range.
    pub fn start(&self, i: usize) -> usize {
        self.starts[i]
    }

    /// End offset of statement `i`. Panics if `i` is out of range.
    pub fn end(&self, i: usize) -> usize {
        self.ends[i]
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    pub fn ends(&self) -> &[usize] {
        &self.ends
    }

    /// End of the last statement, or 0 when there are none.
    pub fn max_end(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// `(start, end)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.starts.iter().copied().zip(self.ends.iter().copied())
    }

    /// Pack fragments back to back, in order.
    ///
    /// Each fragment is shifted by the running offset, which then moves to the
    /// shifted end of that fragment's last statement. Anything a fragment had
    /// after its last statement is not preserved, and an empty fragment
    /// leaves the offset where it was.
    pub fn combine<'a, I>(fragments: I) -> StatementRanges
    where
        I: IntoIterator<Item = &'a StatementRanges>,
    {
        let mut builder = StatementRangesBuilder::new();
        for fragment in fragments {
            builder.append(fragment);
        }
        builder.build()
    }

    /// Statements whose start lies in `[lower, upper)`, offsets unchanged.
    ///
    /// Membership is decided by the start alone: a statement that starts in
    /// range but ends past `upper` is returned whole.
    pub fn extract(&self, lower: usize, upper: usize) -> StatementRanges {
        if lower >= upper {
            return Self::empty();
        }
        let first = self.starts.partition_point(|&s| s < lower);
        let last = self.starts.partition_point(|&s| s < upper);
        Self {
            starts: self.starts[first..last].to_vec(),
            ends: self.ends[first..last].to_vec(),
        }
    }
}

/// Incremental form of [`StatementRanges::combine`].
#[derive(Debug, Clone, Default)]
pub struct StatementRangesBuilder {
    starts: Vec<usize>,
    ends: Vec<usize>,
    offset: usize,
}

impl StatementRangesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment after everything appended so far.
    pub fn append(&mut self, fragment: &StatementRanges) -> &mut Self {
        if fragment.is_empty() {
            return self;
        }
        let offset = self.offset;
        self.starts.extend(fragment.starts.iter().map(|s| s + offset));
        self.ends.extend(fragment.ends.iter().map(|e| e + offset));
        self.offset = fragment.max_end() + offset;
        self
    }

    /// Offset at which the next fragment will be placed.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn build(self) -> StatementRanges {
        StatementRanges {
            starts: self.starts,
            ends: self.ends,
        }
    }
}
