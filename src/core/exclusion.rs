//! # Exclusion Engine Module / 排除引擎模块
//!
//! This module parses exclusion directives and answers "is row R of test
//! case T excluded?". Two input forms are supported:
//!
//! 此模块解析排除指令，并回答"测试用例 T 的第 R 行是否被排除？"。
//! 支持两种输入形式：
//!
//! ## Range directives / 范围指令
//!
//! ```text
//! directive := entry ((',' | ';') entry)*
//! entry     := name | name '[' item (',' item)* ']'
//! item      := index | index '..' index
//! ```
//!
//! `foo` excludes every row of `foo`; `foo[1, 4..6]` excludes rows 1, 4, 5
//! and 6 only. Ranges are inclusive and indices are 0-based.
//!
//! `foo` 排除 `foo` 的所有行；`foo[1, 4..6]` 仅排除第 1、4、5、6 行。
//! 范围是闭区间，索引从 0 开始。
//!
//! ## Name lists / 名称列表
//!
//! ```text
//! --exclude foo,bar --other-flag --exclude=baz
//! ```

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// The argument-stream marker that introduces a list of names to exclude.
/// 参数流中引入待排除名称列表的标记。
pub const EXCLUDE_MARKER: &str = "--exclude";

/// Errors raised while parsing a range directive.
/// 解析范围指令时产生的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExclusionSyntaxError {
    #[error("empty test case name at offset {offset}")]
    EmptyName { offset: usize },

    #[error("index list for '{name}' is never closed")]
    UnclosedList { name: String },

    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("empty index in list for '{name}'")]
    EmptyIndex { name: String },

    #[error("invalid index '{token}' for '{name}'")]
    InvalidIndex { name: String, token: String },

    #[error("range '{token}' for '{name}' is missing a bound")]
    IncompleteRange { name: String, token: String },

    #[error("range {start}..{end} for '{name}' starts after it ends")]
    ReversedRange { name: String, start: u64, end: u64 },

    #[error("unexpected trailing input '{trailing}' after index list for '{name}'")]
    TrailingInput { name: String, trailing: String },
}

/// A set of row indices stored as sorted, disjoint, inclusive ranges.
/// 以有序、不相交的闭区间形式存储的行索引集合。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<(u64, u64)>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the inclusive range `start..=end`, merging it with its neighbours.
    ///
    /// # Errors
    /// `ReversedRange` if `start > end`; the set is left unchanged.
    pub fn insert(&mut self, start: u64, end: u64) -> Result<(), ExclusionSyntaxError> {
        if start > end {
            return Err(ExclusionSyntaxError::ReversedRange {
                name: String::new(),
                start,
                end,
            });
        }
        self.merge_sorted(&[(start, end)]);
        Ok(())
    }

    pub fn insert_index(&mut self, index: u64) {
        self.merge_sorted(&[(index, index)]);
    }

    pub fn union(&mut self, other: &RangeSet) {
        self.merge_sorted(&other.ranges);
    }

    /// Merges ranges whose bounds are already ordered.
    fn merge_sorted(&mut self, ranges: &[(u64, u64)]) {
        self.ranges.extend_from_slice(ranges);
        self.ranges.sort_unstable();

        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(self.ranges.len());
        for &(s, e) in &self.ranges {
            match merged.last_mut() {
                Some(last) if s <= last.1.saturating_add(1) => last.1 = last.1.max(e),
                _ => merged.push((s, e)),
            }
        }
        self.ranges = merged;
    }

    pub fn contains(&self, index: u64) -> bool {
        let pos = self.ranges.partition_point(|&(_, end)| end < index);
        self.ranges
            .get(pos)
            .is_some_and(|&(start, _)| start <= index)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The merged ranges in ascending order.
    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }
}

/// The exclusion predicate of one test case.
/// 单个测试用例的排除谓词。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludedIndices {
    /// Wholesale exclusion: the test case does not run at all.
    All,
    /// Only these rows are excluded; they are reported as not applicable.
    Rows(RangeSet),
}

impl ExcludedIndices {
    pub fn contains(&self, index: u64) -> bool {
        match self {
            ExcludedIndices::All => true,
            ExcludedIndices::Rows(set) => set.contains(index),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ExcludedIndices::All)
    }

    /// Unions `other` into `self`. Wholesale exclusion absorbs any row set.
    pub fn merge(&mut self, other: &ExcludedIndices) {
        match other {
            ExcludedIndices::All => *self = ExcludedIndices::All,
            ExcludedIndices::Rows(theirs) => {
                if let ExcludedIndices::Rows(mine) = self {
                    mine.union(theirs);
                }
            }
        }
    }
}

/// Exclusions for a whole test group, keyed by test case name.
/// 整个测试组的排除项，按测试用例名称索引。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    cases: BTreeMap<String, ExcludedIndices>,
    ignored: Vec<String>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one range directive into a fresh list.
    pub fn parse(directive: &str) -> Result<Self, ExclusionSyntaxError> {
        let mut list = Self::new();
        list.add_directive(directive)?;
        Ok(list)
    }

    /// Parses `directive` and unions its entries into this list.
    ///
    /// Either every entry of the directive is added or, on error, none is.
    ///
    /// 解析 `directive` 并将其条目合并到此列表中。
    /// 要么添加指令中的所有条目，要么（出错时）一个也不添加。
    pub fn add_directive(&mut self, directive: &str) -> Result<(), ExclusionSyntaxError> {
        let mut parsed = Vec::new();
        let mut ignored = Vec::new();
        for (offset, segment) in split_entries(directive)? {
            if segment.trim().is_empty() {
                continue;
            }
            if let Some(trailing) = parse_entry(segment, offset, &mut parsed)? {
                ignored.push(trailing);
            }
        }
        for (name, indices) in parsed {
            self.exclude(name, indices);
        }
        self.ignored.extend(ignored);
        Ok(())
    }

    /// Excludes `name` wholesale.
    pub fn exclude_case(&mut self, name: &str) {
        self.exclude(name.trim().to_string(), ExcludedIndices::All);
    }

    /// Excludes every name yielded by `names` wholesale.
    pub fn exclude_cases<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.exclude_case(name.as_ref());
        }
    }

    fn exclude(&mut self, name: String, indices: ExcludedIndices) {
        match self.cases.get_mut(&name) {
            Some(existing) => existing.merge(&indices),
            None => {
                self.cases.insert(name, indices);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExcludedIndices> {
        self.cases.get(name)
    }

    pub fn is_case_excluded(&self, name: &str) -> bool {
        self.get(name).is_some_and(ExcludedIndices::is_all)
    }

    pub fn is_row_excluded(&self, name: &str, row: u64) -> bool {
        self.get(name).is_some_and(|indices| indices.contains(row))
    }

    /// Names that have at least one exclusion entry.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    /// Trailing text that followed an index list and was tolerated.
    pub fn ignored_trailing(&self) -> &[String] {
        &self.ignored
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }
}

/// Splits a directive at top-level separators, returning each entry with its byte offset.
fn split_entries(directive: &str) -> Result<Vec<(usize, &str)>, ExclusionSyntaxError> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (offset, c) in directive.char_indices() {
        match c {
            '[' if depth == 0 => depth = 1,
            '[' => return Err(ExclusionSyntaxError::UnexpectedChar { found: c, offset }),
            ']' if depth == 1 => depth = 0,
            ']' => return Err(ExclusionSyntaxError::UnexpectedChar { found: c, offset }),
            ',' | ';' if depth == 0 => {
                entries.push((start, &directive[start..offset]));
                start = offset + c.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 {
        let tail = &directive[start..];
        let name = tail.split('[').next().unwrap_or_default().trim().to_string();
        return Err(ExclusionSyntaxError::UnclosedList { name });
    }
    entries.push((start, &directive[start..]));
    Ok(entries)
}

/// Parses one entry, followed by any entries chained directly after its `]`.
///
/// Text after `]` that starts with an identifier is parsed as a further entry.
/// Anything else is tolerated and returned when it holds no digit, bracket or
/// `.`, and rejected otherwise.
fn parse_entry(
    segment: &str,
    offset: usize,
    parsed: &mut Vec<(String, ExcludedIndices)>,
) -> Result<Option<String>, ExclusionSyntaxError> {
    let Some(open) = segment.find('[') else {
        let name = segment.trim();
        if name.is_empty() {
            return Err(ExclusionSyntaxError::EmptyName { offset });
        }
        parsed.push((name.to_string(), ExcludedIndices::All));
        return Ok(None);
    };

    let name = segment[..open].trim();
    if name.is_empty() {
        return Err(ExclusionSyntaxError::EmptyName { offset });
    }
    // split_entries guarantees a matching close bracket inside the segment.
    let close = open
        + segment[open..]
            .find(']')
            .ok_or_else(|| ExclusionSyntaxError::UnclosedList {
                name: name.to_string(),
            })?;

    let mut rows = RangeSet::new();
    for item in segment[open + 1..close].split(',') {
        let (start, end) = parse_item(name, item.trim())?;
        rows.merge_sorted(&[(start, end)]);
    }
    parsed.push((name.to_string(), ExcludedIndices::Rows(rows)));

    let rest = &segment[close + 1..];
    let trailing = rest.trim();
    if trailing.is_empty() {
        return Ok(None);
    }
    if starts_with_entry(trailing) {
        let skipped = rest.len() - rest.trim_start().len();
        return parse_entry(trailing, offset + close + 1 + skipped, parsed);
    }
    if trailing
        .chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '[' | ']' | '.'))
    {
        return Err(ExclusionSyntaxError::TrailingInput {
            name: name.to_string(),
            trailing: trailing.to_string(),
        });
    }
    Ok(Some(trailing.to_string()))
}

/// True when `text` opens with an identifier that runs up to its end or to a `[`.
fn starts_with_entry(text: &str) -> bool {
    let name = text.split('[').next().unwrap_or_default().trim_end();
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn parse_item(name: &str, item: &str) -> Result<(u64, u64), ExclusionSyntaxError> {
    if item.is_empty() {
        return Err(ExclusionSyntaxError::EmptyIndex {
            name: name.to_string(),
        });
    }

    let Some((start, end)) = item.split_once("..") else {
        let index = parse_index(name, item)?;
        return Ok((index, index));
    };

    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return Err(ExclusionSyntaxError::IncompleteRange {
            name: name.to_string(),
            token: item.to_string(),
        });
    }
    let (start, end) = (parse_index(name, start)?, parse_index(name, end)?);
    if start > end {
        return Err(ExclusionSyntaxError::ReversedRange {
            name: name.to_string(),
            start,
            end,
        });
    }
    Ok((start, end))
}

fn parse_index(name: &str, token: &str) -> Result<u64, ExclusionSyntaxError> {
    let invalid = || ExclusionSyntaxError::InvalidIndex {
        name: name.to_string(),
        token: token.to_string(),
    };
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    token.parse::<u64>().map_err(|_| invalid())
}

/// Collects test case names that follow `marker` in an argument stream.
///
/// Each occurrence of `marker` is followed by a comma-separated list of names;
/// `marker=a,b` is accepted as well. Occurrences accumulate. Every other
/// token, and a trailing marker with no list, is ignored.
///
/// 收集参数流中 `marker` 之后的测试用例名称。
/// 每次出现 `marker` 后面都跟着逗号分隔的名称列表；也接受 `marker=a,b`。
/// 多次出现会累积。其他所有标记以及没有列表的末尾标记都会被忽略。
pub fn parse_name_list<S: AsRef<str>>(tokens: &[S], marker: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let joined_prefix = format!("{}=", marker);
    let mut tokens = tokens.iter().map(<S as AsRef<str>>::as_ref);

    while let Some(token) = tokens.next() {
        let list = if token == marker {
            match tokens.next() {
                Some(list) => list,
                None => break,
            }
        } else if let Some(list) = token.strip_prefix(&joined_prefix) {
            list
        } else {
            continue;
        };

        names.extend(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        );
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_set_merges_adjacent_ranges() {
        let mut set = RangeSet::new();
        set.insert(5, 7).unwrap();
        set.insert(0, 2).unwrap();
        set.insert(3, 4).unwrap();
        set.insert_index(6);
        assert_eq!(set.ranges(), &[(0, 7)]);
    }

    #[test]
    fn test_range_set_handles_u64_max() {
        let mut set = RangeSet::new();
        set.insert(10, u64::MAX).unwrap();
        set.insert(u64::MAX, u64::MAX).unwrap();
        assert!(set.contains(u64::MAX));
        assert!(!set.contains(9));
        assert_eq!(set.ranges(), &[(10, u64::MAX)]);
    }

    #[test]
    fn test_range_set_rejects_reversed_bounds() {
        let mut set = RangeSet::new();
        set.insert(0, 1).unwrap();
        assert!(matches!(
            set.insert(5, 2),
            Err(ExclusionSyntaxError::ReversedRange { start: 5, end: 2, .. })
        ));
        assert_eq!(set.ranges(), &[(0, 1)]);
        assert!(!set.contains(3));
    }

    #[test]
    fn test_split_entries_keeps_bracketed_commas() {
        let entries = split_entries("a[1,2], b;c").unwrap();
        let segments: Vec<&str> = entries.iter().map(|(_, s)| *s).collect();
        assert_eq!(segments, vec!["a[1,2]", " b", "c"]);
    }
}
