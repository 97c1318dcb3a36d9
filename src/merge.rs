//! Sorted merge-join over index-keyed streams.
//!
//! Both inputs must be non-decreasing in key. The join does not sort and,
//! unless [`check_sorted`] is applied first, does not detect out-of-order
//! input; the result for unsorted input is unspecified.
//!
//! Duplicate keys pair one-to-one in input order: `[2:a, 2:b]` joined with
//! `[2:x]` yields only `2:(a, x)`, and `2:b` is discarded.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::Path;

use crate::parser::{parse_number, split_fields};
use crate::{Error, Result};

/// Iterator adapter produced by [`MergeJoin::new`].
pub struct MergeJoin<L, R, F>
where
    L: Iterator,
    R: Iterator,
{
    left: Peekable<L>,
    right: Peekable<R>,
    combine: F,
}

impl<K, A, B, O, L, R, F> MergeJoin<L, R, F>
where
    K: Ord,
    L: Iterator<Item = (K, A)>,
    R: Iterator<Item = (K, B)>,
    F: FnMut(A, B) -> O,
{
    pub fn new<IL, IR>(left: IL, right: IR, combine: F) -> Self
    where
        IL: IntoIterator<IntoIter = L>,
        IR: IntoIterator<IntoIter = R>,
    {
        Self {
            left: left.into_iter().peekable(),
            right: right.into_iter().peekable(),
            combine,
        }
    }
}

impl<K, A, B, O, L, R, F> Iterator for MergeJoin<L, R, F>
where
    K: Ord,
    L: Iterator<Item = (K, A)>,
    R: Iterator<Item = (K, B)>,
    F: FnMut(A, B) -> O,
{
    type Item = (K, O);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ord = {
                let (lk, _) = self.left.peek()?;
                let (rk, _) = self.right.peek()?;
                lk.cmp(rk)
            };
            match ord {
                Ordering::Equal => {
                    let (key, a) = self.left.next()?;
                    let (_, b) = self.right.next()?;
                    return Some((key, (self.combine)(a, b)));
                }
                // A right key below every remaining left key can never match.
                Ordering::Greater => {
                    self.right.next();
                }
                Ordering::Less => {
                    self.left.next();
                }
            }
        }
    }
}

/// Join two key-sorted sequences, keeping only keys present on both sides.
pub fn merge_join<K, A, B, O, IL, IR, F>(left: IL, right: IR, combine: F) -> Vec<(K, O)>
where
    K: Ord,
    IL: IntoIterator<Item = (K, A)>,
    IR: IntoIterator<Item = (K, B)>,
    F: FnMut(A, B) -> O,
{
    MergeJoin::new(left, right, combine).collect()
}

/// Verify that keys are non-decreasing.
pub fn check_sorted<I>(keys: I, side: &'static str) -> Result<()>
where
    I: IntoIterator<Item = u64>,
{
    let mut previous: Option<u64> = None;
    for key in keys {
        if let Some(prev) = previous {
            if key < prev {
                return Err(Error::UnsortedInput {
                    side,
                    previous: prev,
                    key,
                });
            }
        }
        previous = Some(key);
    }
    Ok(())
}

/// Options for the merge tools.
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    /// Reject keyed input whose keys decrease
    pub strict: bool,
    /// Allow positional rule merges over files of different length
    pub truncate: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            strict: true,
            truncate: false,
        }
    }
}

/// One side of a merge: the file text and its name for error messages.
#[derive(Debug, Clone, Copy)]
pub struct MergeSource<'a> {
    pub text: &'a str,
    pub path: &'a Path,
}

impl<'a> MergeSource<'a> {
    pub fn new(text: &'a str, path: &'a Path) -> Self {
        Self { text, path }
    }

    fn lines(&self) -> impl Iterator<Item = (usize, &'a str)> {
        self.text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
    }

    /// Every line by position, blank ones kept as empty fragments.
    ///
    /// Trailing blank lines at the end of the file are not counted.
    fn positional(&self) -> Vec<&'a str> {
        let mut lines: Vec<&str> = self.text.lines().map(str::trim).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// Parse `index field...` lines.
    fn keyed(&self) -> Result<Vec<(u64, Vec<&'a str>)>> {
        self.lines()
            .map(|(line_no, line)| {
                let mut fields = split_fields(line);
                let key = parse_number(fields[0], 1).map_err(|e| e.at_line(self.path, line_no))?;
                fields.remove(0);
                Ok((key, fields))
            })
            .collect()
    }
}

/// Merge two keyed header-annotation files.
///
/// Each output line is the shared rule index followed by the left fields
/// and then the right fields.
pub fn merge_headers(left: MergeSource<'_>, right: MergeSource<'_>, opts: MergeOptions) -> Result<String> {
    let lhs = left.keyed()?;
    let rhs = right.keyed()?;
    if opts.strict {
        check_sorted(lhs.iter().map(|(k, _)| *k), "left")?;
        check_sorted(rhs.iter().map(|(k, _)| *k), "right")?;
    }
    let (left_len, right_len) = (lhs.len(), rhs.len());

    let joined = merge_join(lhs, rhs, |mut a, b| {
        a.extend(b);
        a
    });
    log::info!(
        "Merged {} of {}/{} header entries",
        joined.len(),
        left_len,
        right_len
    );

    let mut out = String::new();
    for (key, fields) in joined {
        out.push_str(&key.to_string());
        for field in fields {
            out.push(' ');
            out.push_str(field);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Merge two rule-fragment files by line position.
///
/// Line `i` of the left file pairs with line `i` of the right file. A blank
/// line is an empty fragment that keeps its position. Files of different
/// length are rejected unless `opts.truncate` is set, in which case the
/// output stops at the shorter file.
pub fn merge_rules(left: MergeSource<'_>, right: MergeSource<'_>, opts: MergeOptions) -> Result<String> {
    let lhs = left.positional();
    let rhs = right.positional();

    if lhs.len() != rhs.len() {
        if !opts.truncate {
            return Err(Error::LineCountMismatch {
                left: lhs.len(),
                right: rhs.len(),
            });
        }
        log::warn!(
            "Rule files differ in length ({} vs {}), truncating to {}",
            lhs.len(),
            rhs.len(),
            lhs.len().min(rhs.len())
        );
    }

    let joined = merge_join(
        lhs.into_iter().enumerate(),
        rhs.into_iter().enumerate(),
        |a, b| (a, b),
    );
    log::info!("Merged {} rule lines", joined.len());

    let mut out = String::new();
    for (_, (a, b)) in joined {
        out.push_str(a);
        if !a.is_empty() && !b.is_empty() {
            out.push(' ');
        }
        out.push_str(b);
        out.push('\n');
    }
    Ok(out)
}
