//! Numeric building blocks shared by the feature extensions.

pub mod ordinal;
pub mod spacing;
pub mod tracks;

pub use ordinal::{ListStyle, marker};
pub use spacing::{ContentDistribution, ItemSpacing, distribute, total_spacing};
pub use tracks::{
    SpanContribution, TrackBreadth, TrackSize, TrackSizing, parse_track_list, resolve_tracks,
    span_contribution, total_gaps, track_offsets,
};
