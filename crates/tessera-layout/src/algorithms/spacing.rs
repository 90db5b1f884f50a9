//! Content distribution (`justify-content` / `align-content`).
//!
//! Leftover space is turned into whole-pixel margins on the items. The
//! remainder of the integer division goes to the earliest slots, one pixel
//! each, so the margins always add up to the leftover exactly.

use strum_macros::{Display, EnumString};

/// Distribution keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ContentDistribution {
    /// `normal`
    #[default]
    Normal,
    /// `start`, `flex-start`, `left`
    #[strum(serialize = "start", serialize = "flex-start", serialize = "left")]
    Start,
    /// `end`, `flex-end`, `right`
    #[strum(serialize = "end", serialize = "flex-end", serialize = "right")]
    End,
    /// `center`
    Center,
    /// `stretch`
    Stretch,
    /// `space-between`
    SpaceBetween,
    /// `space-around`
    SpaceAround,
    /// `space-evenly`
    SpaceEvenly,
}

impl ContentDistribution {
    /// Parses a computed value, ignoring `safe` / `unsafe` prefixes.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let keyword = value.split_whitespace().last().unwrap_or_default();
        keyword.parse().unwrap_or_default()
    }

    /// Whether space goes between items rather than around the group.
    #[must_use]
    pub fn is_spacing(self) -> bool {
        matches!(
            self,
            ContentDistribution::SpaceBetween
                | ContentDistribution::SpaceAround
                | ContentDistribution::SpaceEvenly
        )
    }
}

/// Margins to add before and after one item along the main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemSpacing {
    /// Added before the item.
    pub start: i32,
    /// Added after the item.
    pub end: i32,
}

/// Sum of all margins produced by [`distribute`].
#[must_use]
pub fn total_spacing(spacing: &[ItemSpacing]) -> i32 {
    spacing.iter().map(|s| s.start + s.end).sum()
}

/// Spreads `leftover` pixels over `count` items.
///
/// - `space-between`: gap `i` (before item `i`, `i >= 1`) gets
///   `L / (n - 1)`, plus one when `i - 1 < L % (n - 1)`.
/// - `space-around`: each item gets `L / 2n` per side; the excess pixels go
///   to the sides in order, start side of item `i` when `2i < excess`, end
///   side when `2i + 1 < excess`.
/// - `space-evenly`: each of the `n + 1` gaps gets `L / (n + 1)`; the start
///   gap of item `i` gets one more when `i < excess`. The trailing gap never
///   does.
/// - `center`: half before the first item, the rest after the last.
/// - `end`: everything before the first item.
///
/// Nothing is distributed when `leftover <= 0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn distribute(distribution: ContentDistribution, count: usize, leftover: i32) -> Vec<ItemSpacing> {
    let mut spacing = vec![ItemSpacing::default(); count];
    if count == 0 || leftover <= 0 {
        return spacing;
    }
    let n = count as i32;
    let last = count - 1;
    match distribution {
        ContentDistribution::Normal | ContentDistribution::Start | ContentDistribution::Stretch => {}
        ContentDistribution::End => spacing[0].start = leftover,
        ContentDistribution::Center => {
            let half = leftover / 2;
            spacing[0].start = half;
            spacing[last].end += leftover - half;
        }
        ContentDistribution::SpaceBetween => {
            if count > 1 {
                let gaps = n - 1;
                let base = leftover / gaps;
                let excess = leftover % gaps;
                for (i, item) in spacing.iter_mut().enumerate().skip(1) {
                    item.start = base + i32::from(((i - 1) as i32) < excess);
                }
            }
        }
        ContentDistribution::SpaceAround => {
            let half = leftover / (2 * n);
            let excess = leftover - half * 2 * n;
            for (i, item) in spacing.iter_mut().enumerate() {
                let i = i as i32;
                item.start = half + i32::from(2 * i < excess);
                item.end = half + i32::from(2 * i + 1 < excess);
            }
        }
        ContentDistribution::SpaceEvenly => {
            let gap = leftover / (n + 1);
            let excess = leftover - gap * (n + 1);
            for (i, item) in spacing.iter_mut().enumerate() {
                item.start = gap + i32::from((i as i32) < excess);
            }
            spacing[last].end = gap;
        }
    }
    spacing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(ContentDistribution::parse("space-between"), ContentDistribution::SpaceBetween);
        assert_eq!(ContentDistribution::parse("flex-end"), ContentDistribution::End);
        assert_eq!(ContentDistribution::parse("safe center"), ContentDistribution::Center);
        assert_eq!(ContentDistribution::parse("bogus"), ContentDistribution::Normal);
    }

    #[test]
    fn test_space_between_excess_to_first_gaps() {
        let spacing = distribute(ContentDistribution::SpaceBetween, 4, 11);
        let gaps: Vec<i32> = spacing.iter().map(|s| s.start).collect();
        assert_eq!(gaps, vec![0, 4, 4, 3]);
    }

    #[test]
    fn test_space_evenly_trailing_gap() {
        let spacing = distribute(ContentDistribution::SpaceEvenly, 2, 10);
        assert_eq!(
            spacing,
            vec![ItemSpacing { start: 4, end: 0 }, ItemSpacing { start: 3, end: 3 }]
        );
    }

    #[test]
    fn test_single_item_center() {
        let spacing = distribute(ContentDistribution::Center, 1, 9);
        assert_eq!(spacing, vec![ItemSpacing { start: 4, end: 5 }]);
    }
}
