//! Heading level assignment by font-size rank
//!
//! Levels are decided on the full candidate set: the distinct font sizes are
//! ranked largest first and the top `max_levels` become H1, H2, ... Candidates
//! whose size ranks lower are dropped from the outline.

use crate::classifier::HeadingCandidate;
use crate::outline::OutlineEntry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Heading level; `H1` is the largest font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const H1: Self = HeadingLevel(1);
    pub const H2: Self = HeadingLevel(2);
    pub const H3: Self = HeadingLevel(3);

    /// Level for a 0-based size rank
    pub fn from_rank(rank: usize) -> Option<Self> {
        u8::try_from(rank + 1).ok().map(HeadingLevel)
    }

    /// 1 for H1, 2 for H2, ...
    pub fn depth(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHeadingLevel(String);

impl fmt::Display for InvalidHeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid heading level: {:?}", self.0)
    }
}

impl std::error::Error for InvalidHeadingLevel {}

impl FromStr for HeadingLevel {
    type Err = InvalidHeadingLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('H')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|&n| n >= 1)
            .map(HeadingLevel)
            .ok_or_else(|| InvalidHeadingLevel(s.to_string()))
    }
}

impl Serialize for HeadingLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HeadingLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Distinct candidate font sizes, largest first, limited to `max_levels`
pub fn ranked_sizes(candidates: &[HeadingCandidate], max_levels: usize) -> Vec<f32> {
    let mut sizes: Vec<f32> = candidates
        .iter()
        .map(|c| c.font_size)
        .filter(|s| s.is_finite())
        .collect();
    sizes.sort_by(|a, b| b.total_cmp(a));
    sizes.dedup();
    sizes.truncate(max_levels);
    sizes
}

/// Assign levels and build the outline entries, in candidate order
pub fn assign_levels(candidates: &[HeadingCandidate], max_levels: usize) -> Vec<OutlineEntry> {
    let sizes = ranked_sizes(candidates, max_levels);

    candidates
        .iter()
        .filter_map(|c| {
            let rank = sizes.iter().position(|&s| s == c.font_size)?;
            Some(OutlineEntry {
                level: HeadingLevel::from_rank(rank)?,
                text: c.text.clone(),
                page: c.page,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, font_size: f32, page: u32) -> HeadingCandidate {
        HeadingCandidate {
            text: text.into(),
            font_size,
            bold: false,
            italic: false,
            page,
        }
    }

    #[test]
    fn test_single_size_is_h1() {
        let entries = assign_levels(&[candidate("Introduction to Systems", 16.0, 1)], 3);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, HeadingLevel::H1);
        assert_eq!(entries[0].page, 1);
    }

    #[test]
    fn test_top_three_sizes_kept_in_order() {
        let candidates = vec![
            candidate("Small", 10.0, 1),
            candidate("Large", 18.0, 1),
            candidate("Tiny", 9.0, 2),
            candidate("Medium", 14.0, 2),
            candidate("Large again", 18.0, 3),
        ];
        let entries = assign_levels(&candidates, 3);
        let got: Vec<(String, String)> = entries
            .iter()
            .map(|e| (e.level.to_string(), e.text.clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("H3".to_string(), "Small".to_string()),
                ("H1".to_string(), "Large".to_string()),
                ("H2".to_string(), "Medium".to_string()),
                ("H1".to_string(), "Large again".to_string()),
            ]
        );
    }

    #[test]
    fn test_levels_monotonic_with_size() {
        let candidates: Vec<HeadingCandidate> = [12.0, 20.0, 16.0, 12.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, &s)| candidate(&format!("H{}", i), s, 1))
            .collect();
        let entries = assign_levels(&candidates, 3);
        for a in &entries {
            for b in &entries {
                let size_a = candidates.iter().find(|c| c.text == a.text).unwrap().font_size;
                let size_b = candidates.iter().find(|c| c.text == b.text).unwrap().font_size;
                if size_a > size_b {
                    assert!(a.level.depth() < b.level.depth());
                }
            }
        }
    }

    #[test]
    fn test_custom_max_levels() {
        let candidates = vec![
            candidate("A", 20.0, 1),
            candidate("B", 16.0, 1),
            candidate("C", 12.0, 1),
            candidate("D", 10.0, 1),
        ];
        assert_eq!(assign_levels(&candidates, 4).len(), 4);
        assert_eq!(assign_levels(&candidates, 4)[3].level.to_string(), "H4");
        assert_eq!(assign_levels(&candidates, 1).len(), 1);
        assert!(assign_levels(&candidates, 0).is_empty());
    }

    #[test]
    fn test_empty_candidates() {
        assert!(assign_levels(&[], 3).is_empty());
        assert!(ranked_sizes(&[], 3).is_empty());
    }

    #[test]
    fn test_heading_level_parse_and_serialize() {
        assert_eq!("H2".parse::<HeadingLevel>().unwrap(), HeadingLevel::H2);
        assert!("H0".parse::<HeadingLevel>().is_err());
        assert!("2".parse::<HeadingLevel>().is_err());
        assert_eq!(serde_json::to_string(&HeadingLevel::H3).unwrap(), "\"H3\"");
        let level: HeadingLevel = serde_json::from_str("\"H1\"").unwrap();
        assert_eq!(level, HeadingLevel::H1);
    }
}
