use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::{Error, Interval, Result};

/// A key-partitioned coalescing interval set over non-negative positions.
///
/// For every key the stored intervals are sorted by start and pairwise disjoint and
/// non-adjacent. A key is removed as soon as it holds no interval.
///
/// The windowing engine uses it to pin rows as force-rendered independently of visibility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeManager {
    ranges: BTreeMap<String, Vec<Interval>>,
}

fn validate(start: i64, end: i64) -> Result<()> {
    if start > end || start < 0 || end < 0 {
        rwarn!(start, end, "RangeManager: invalid range");
        return Err(Error::InvalidRange { start, end });
    }
    Ok(())
}

/// Sorts by start and merges overlapping or adjacent intervals.
fn coalesce(mut intervals: Vec<Interval>) -> Vec<Interval> {
    if intervals.len() <= 1 {
        return intervals;
    }
    intervals.sort_unstable();
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(cur) => match cur.try_merge(&next) {
                Some(joined) => *cur = joined,
                None => merged.push(next),
            },
            None => merged.push(next),
        }
    }
    merged
}

impl RangeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `start..=end` under `key`, merging with any interval it overlaps or touches.
    pub fn set_range(&mut self, key: &str, start: i64, end: i64) -> Result<()> {
        validate(start, end)?;
        let mut intervals = self.ranges.remove(key).unwrap_or_default();
        intervals.push(Interval::new(start, end));
        self.ranges.insert(key.to_string(), coalesce(intervals));
        rtrace!(key, start, end, "set_range");
        Ok(())
    }

    /// Removes `start..=end` from every interval under `key`, keeping what lies outside.
    ///
    /// Intervals fully inside the region are dropped; partially covered ones are cut at
    /// `start - 1` / `end + 1`.
    pub fn remove_range_in_region(&mut self, key: &str, start: i64, end: i64) -> Result<()> {
        validate(start, end)?;
        let Some(intervals) = self.ranges.remove(key) else {
            return Ok(());
        };

        let region = Interval::new(start, end);
        let mut kept = Vec::with_capacity(intervals.len() + 1);
        for iv in intervals {
            if iv.start >= region.start && iv.end <= region.end {
                continue;
            }
            let overlaps = !(iv.end < region.start || iv.start > region.end);
            if !overlaps {
                kept.push(iv);
                continue;
            }
            if iv.start < region.start {
                kept.push(Interval::new(iv.start, region.start - 1));
            }
            if iv.end > region.end {
                kept.push(Interval::new(region.end + 1, iv.end));
            }
        }
        kept.retain(|iv| iv.start <= iv.end);

        if !kept.is_empty() {
            self.ranges.insert(key.to_string(), kept);
        }
        rtrace!(key, start, end, "remove_range_in_region");
        Ok(())
    }

    /// Whether `pos` lies inside any interval under any key.
    pub fn is_in_range(&self, pos: i64) -> bool {
        self.ranges
            .values()
            .any(|intervals| intervals.iter().any(|iv| iv.contains(pos)))
    }

    /// Whether `pos` lies inside an interval stored under `key`.
    pub fn is_in_range_for(&self, key: &str, pos: i64) -> bool {
        self.ranges
            .get(key)
            .is_some_and(|intervals| intervals.iter().any(|iv| iv.contains(pos)))
    }

    /// Remaps every boundary through `map_position` after a content edit.
    ///
    /// If either boundary of an interval maps to `None` (or the result is negative or
    /// inverted) the whole interval is dropped. Survivors are re-coalesced; keys left
    /// empty are removed.
    pub fn update_ranges(&mut self, mut map_position: impl FnMut(i64) -> Option<i64>) {
        let old = core::mem::take(&mut self.ranges);
        for (key, intervals) in old {
            let mut mapped = Vec::with_capacity(intervals.len());
            for iv in intervals {
                let (Some(start), Some(end)) = (map_position(iv.start), map_position(iv.end))
                else {
                    continue;
                };
                if start < 0 || start > end {
                    continue;
                }
                mapped.push(Interval::new(start, end));
            }
            if !mapped.is_empty() {
                self.ranges.insert(key, coalesce(mapped));
            }
        }
    }

    pub fn ranges(&self, key: &str) -> Option<&[Interval]> {
        self.ranges.get(key).map(Vec::as_slice)
    }

    /// Iterates over `(key, intervals)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Interval])> {
        self.ranges
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn key_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear_range(&mut self, key: &str) {
        self.ranges.remove(key);
    }

    pub fn clear_all(&mut self) {
        self.ranges.clear();
    }
}
