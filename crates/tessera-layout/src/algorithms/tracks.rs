//! Grid track parsing and sizing.
//!
//! Fixed tracks take their literal size, percentages resolve against the
//! container, intrinsic tracks take their content size. Flexible (`fr`)
//! tracks keep a weight so the target can distribute space itself; a pixel
//! size is still computed for targets and checks that need one.

use tessera_common::units::{LengthContext, parse_length, parse_number, parse_percent, split_outside_parens};
use tessera_common::warning::warn_once;

/// One side of a track sizing function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackBreadth {
    /// Literal pixels.
    Px(f32),
    /// Fraction of the container (`0.5` for `50%`).
    Percent(f32),
    /// Flexible share.
    Fr(f32),
    /// Content-sized.
    Auto,
    /// Smallest content size.
    MinContent,
    /// Largest content size.
    MaxContent,
}

impl TrackBreadth {
    fn parse(token: &str, context: &LengthContext) -> TrackBreadth {
        let token = token.trim();
        match token {
            "auto" => return TrackBreadth::Auto,
            "min-content" => return TrackBreadth::MinContent,
            "max-content" => return TrackBreadth::MaxContent,
            _ => {}
        }
        if let Some(fr) = token.strip_suffix("fr") {
            return TrackBreadth::Fr(parse_number(fr).max(0.0));
        }
        if let Some(fraction) = parse_percent(token) {
            return TrackBreadth::Percent(fraction);
        }
        if let Some(px) = parse_length(token, context) {
            return TrackBreadth::Px(px.max(0.0));
        }
        warn_once("grid", &format!("unsupported track size '{token}', using auto"));
        TrackBreadth::Auto
    }

    fn resolve(self, available: f32, content: f32) -> f32 {
        match self {
            TrackBreadth::Px(px) => px,
            TrackBreadth::Percent(fraction) => fraction * available,
            TrackBreadth::Fr(_) => 0.0,
            TrackBreadth::Auto | TrackBreadth::MinContent | TrackBreadth::MaxContent => content,
        }
    }

    fn is_intrinsic(self) -> bool {
        matches!(
            self,
            TrackBreadth::Auto | TrackBreadth::MinContent | TrackBreadth::MaxContent
        )
    }
}

/// A track sizing function: `minmax(min, max)`, or one breadth for both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSize {
    /// Lower bound.
    pub min: TrackBreadth,
    /// Upper bound, or the flexible share.
    pub max: TrackBreadth,
}

impl TrackSize {
    /// `<px>`
    #[must_use]
    pub const fn fixed(px: f32) -> Self {
        Self {
            min: TrackBreadth::Px(px),
            max: TrackBreadth::Px(px),
        }
    }

    /// `<n>fr`, which is `minmax(auto, <n>fr)`.
    #[must_use]
    pub const fn flex(fr: f32) -> Self {
        Self {
            min: TrackBreadth::Auto,
            max: TrackBreadth::Fr(fr),
        }
    }

    /// `auto`
    #[must_use]
    pub const fn auto() -> Self {
        Self {
            min: TrackBreadth::Auto,
            max: TrackBreadth::Auto,
        }
    }

    /// Flexible share, `0.0` for inflexible tracks.
    #[must_use]
    pub fn fr(&self) -> f32 {
        match self.max {
            TrackBreadth::Fr(fr) => fr,
            _ => 0.0,
        }
    }

    /// Whether the track takes a share of the free space.
    #[must_use]
    pub fn is_flexible(&self) -> bool {
        self.fr() > 0.0
    }

    /// Whether the track grows into leftover space when content is stretched.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.min.is_intrinsic() && self.max == TrackBreadth::Auto
    }

    fn parse(token: &str, context: &LengthContext) -> TrackSize {
        if let Some(args) = function_args(token, "minmax") {
            let parts = split_outside_parens(args, ',');
            if let [min, max] = parts.as_slice() {
                return TrackSize {
                    min: TrackBreadth::parse(min, context),
                    max: TrackBreadth::parse(max, context),
                };
            }
        }
        if let Some(args) = function_args(token, "fit-content") {
            return TrackSize {
                min: TrackBreadth::Auto,
                max: TrackBreadth::parse(args, context),
            };
        }
        match TrackBreadth::parse(token, context) {
            TrackBreadth::Fr(fr) => TrackSize::flex(fr),
            breadth => TrackSize {
                min: breadth,
                max: breadth,
            },
        }
    }
}

fn function_args<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    token
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Most tracks a template list expands to.
const TRACK_LIMIT: usize = 1000;

/// Parses `grid-template-columns` / `grid-template-rows`.
///
/// `repeat(n, ...)` is expanded; `auto-fill` / `auto-fit` repeat once.
/// Line names are ignored. Expansion stops at a thousand tracks.
#[must_use]
pub fn parse_track_list(value: &str, context: &LengthContext) -> Vec<TrackSize> {
    let mut tracks = Vec::new();
    let value = value.trim();
    if value.is_empty() || value == "none" {
        return tracks;
    }
    for token in split_outside_parens(value, ' ') {
        if token.starts_with('[') || token.ends_with(']') {
            continue;
        }
        if let Some(args) = function_args(token, "repeat") {
            let parts = split_outside_parens(args, ',');
            let Some((count, rest)) = parts.split_first() else {
                continue;
            };
            let count = match *count {
                "auto-fill" | "auto-fit" => {
                    warn_once("grid", &format!("repeat({count}) is repeated once"));
                    1
                }
                n => n.parse::<usize>().unwrap_or(1).max(1),
            };
            let pattern = parse_track_list(&rest.join(" "), context);
            for _ in 0..count {
                if tracks.len() >= TRACK_LIMIT || pattern.is_empty() {
                    break;
                }
                tracks.extend_from_slice(&pattern);
            }
        } else {
            tracks.push(TrackSize::parse(token, context));
        }
    }
    tracks.truncate(TRACK_LIMIT);
    tracks
}

/// Result of [`resolve_tracks`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSizing {
    /// Final size of each track.
    pub sizes: Vec<f32>,
    /// Size of each track before free space was distributed.
    pub base: Vec<f32>,
    /// Flexible weight of each track, `0.0` when inflexible.
    pub weights: Vec<f32>,
    /// Space left after all tracks and gaps; negative on overflow.
    pub free_space: f32,
}

impl TrackSizing {
    /// Whether any track is flexible.
    #[must_use]
    pub fn has_flexible(&self) -> bool {
        self.weights.iter().any(|&w| w > 0.0)
    }
}

/// Total gap space between `count` tracks.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn total_gaps(count: usize, gap: f32) -> f32 {
    if count > 1 { gap * (count - 1) as f32 } else { 0.0 }
}

/// Sizes `tracks` into `available` pixels.
///
/// `content[i]` is the largest content contribution of items in track `i`
/// (missing entries count as zero). With `stretch`, leftover space is shared
/// by `auto` tracks when no track is flexible.
///
/// `sizes` plus gaps plus `free_space` always equals `available`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn resolve_tracks(
    tracks: &[TrackSize],
    available: f32,
    gap: f32,
    content: &[f32],
    stretch: bool,
) -> TrackSizing {
    let count = tracks.len();
    let gaps = total_gaps(count, gap);
    let content_of = |i: usize| content.get(i).copied().unwrap_or(0.0);

    let base: Vec<f32> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let min = track.min.resolve(available, content_of(i));
            if track.is_flexible() {
                min
            } else {
                min.max(track.max.resolve(available, content_of(i)))
            }
        })
        .collect();
    let weights: Vec<f32> = tracks.iter().map(TrackSize::fr).collect();
    let mut sizes = base.clone();

    let mut flexible: Vec<usize> = (0..count).filter(|&i| weights[i] > 0.0).collect();
    if !flexible.is_empty() {
        // Tracks whose floor exceeds their share are frozen at the floor and
        // the share is recomputed without them.
        loop {
            let frozen: f32 = (0..count)
                .filter(|i| !flexible.contains(i))
                .map(|i| base[i])
                .sum();
            let total_fr: f32 = flexible.iter().map(|&i| weights[i]).sum::<f32>().max(1.0);
            let per_fr = ((available - gaps - frozen) / total_fr).max(0.0);
            let before = flexible.len();
            flexible.retain(|&i| base[i] <= per_fr * weights[i]);
            if flexible.len() == before {
                for &i in &flexible {
                    sizes[i] = per_fr * weights[i];
                }
                break;
            }
        }
    } else if stretch {
        let auto: Vec<usize> = (0..count).filter(|&i| tracks[i].is_auto()).collect();
        let leftover = available - gaps - sizes.iter().sum::<f32>();
        if !auto.is_empty() && leftover > 0.0 {
            let share = leftover / auto.len() as f32;
            for i in auto {
                sizes[i] += share;
            }
        }
    }

    let free_space = available - gaps - sizes.iter().sum::<f32>();
    TrackSizing {
        sizes,
        base,
        weights,
        free_space,
    }
}

/// What a spanning item contributes to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpanContribution {
    /// Pixel floor: inflexible tracks, flexible floors and inner gaps.
    pub fixed: f32,
    /// Sum of the flexible shares.
    pub weight: f32,
}

/// Contribution of an item spanning `span` tracks from `start`.
#[must_use]
pub fn span_contribution(sizing: &TrackSizing, start: usize, span: usize, gap: f32) -> SpanContribution {
    let end = (start + span.max(1)).min(sizing.sizes.len());
    let mut contribution = SpanContribution::default();
    for i in start..end {
        if sizing.weights[i] > 0.0 {
            contribution.weight += sizing.weights[i];
            contribution.fixed += sizing.base[i];
        } else {
            contribution.fixed += sizing.sizes[i];
        }
    }
    contribution.fixed += total_gaps(end.saturating_sub(start), gap);
    contribution
}

/// Start offset of each track.
#[must_use]
pub fn track_offsets(sizes: &[f32], gap: f32, start: f32) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut position = start;
    for &size in sizes {
        offsets.push(position);
        position += size + gap;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeat_and_minmax() {
        let ctx = LengthContext::default();
        let tracks = parse_track_list("[a] 100px repeat(2, 1fr) minmax(50px, 2fr)", &ctx);
        assert_eq!(
            tracks,
            vec![
                TrackSize::fixed(100.0),
                TrackSize::flex(1.0),
                TrackSize::flex(1.0),
                TrackSize {
                    min: TrackBreadth::Px(50.0),
                    max: TrackBreadth::Fr(2.0)
                },
            ]
        );
    }

    #[test]
    fn test_repeat_expansion_is_bounded() {
        let ctx = LengthContext::default();
        assert_eq!(parse_track_list("repeat(999999999, 10px 1fr)", &ctx).len(), TRACK_LIMIT);
    }

    #[test]
    fn test_parse_none() {
        assert!(parse_track_list("none", &LengthContext::default()).is_empty());
    }

    #[test]
    fn test_flexible_floor_frozen() {
        let tracks = [
            TrackSize {
                min: TrackBreadth::Px(150.0),
                max: TrackBreadth::Fr(1.0),
            },
            TrackSize::flex(1.0),
        ];
        let sizing = resolve_tracks(&tracks, 200.0, 0.0, &[], false);
        assert_eq!(sizing.sizes, vec![150.0, 50.0]);
        assert_eq!(sizing.free_space, 0.0);
    }

    #[test]
    fn test_track_offsets() {
        assert_eq!(track_offsets(&[10.0, 20.0, 30.0], 5.0, 2.0), vec![2.0, 17.0, 42.0]);
    }
}
