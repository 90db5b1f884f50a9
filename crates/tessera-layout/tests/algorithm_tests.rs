//! Tests for the shared layout algorithms.

use quickcheck_macros::quickcheck;
use tessera_common::units::LengthContext;
use tessera_layout::algorithms::{
    ContentDistribution, ListStyle, TrackSize, distribute, marker, parse_track_list, resolve_tracks,
    span_contribution, total_gaps, total_spacing,
};
use tessera_layout::text::{ApproximateTextMeasurer, partition_columns, split_words};

// ========== grid tracks ==========

#[test]
fn test_span_over_flexible_track() {
    let tracks = parse_track_list("50px 1fr 30px", &LengthContext::default());
    let sizing = resolve_tracks(&tracks, 400.0, 10.0, &[], false);

    assert_eq!(sizing.sizes, vec![50.0, 300.0, 30.0]);
    let span = span_contribution(&sizing, 0, 3, 10.0);
    assert_eq!(span.fixed, 100.0);
    assert!(span.weight > 0.0);

    let fixed_only = span_contribution(&sizing, 2, 1, 10.0);
    assert_eq!(fixed_only.fixed, 30.0);
    assert_eq!(fixed_only.weight, 0.0);
}

#[test]
fn test_auto_tracks_stretch_into_leftover() {
    let tracks = parse_track_list("100px auto auto", &LengthContext::default());
    let sizing = resolve_tracks(&tracks, 300.0, 0.0, &[20.0, 40.0], true);
    assert_eq!(sizing.sizes, vec![100.0, 90.0, 110.0]);
    assert_eq!(sizing.free_space, 0.0);
}

#[test]
fn test_percent_tracks_resolve_against_container() {
    let tracks = parse_track_list("25% 75%", &LengthContext::default());
    let sizing = resolve_tracks(&tracks, 200.0, 0.0, &[], false);
    assert_eq!(sizing.sizes, vec![50.0, 150.0]);
    assert!(!sizing.has_flexible());
}

#[quickcheck]
fn prop_tracks_fill_available_space(fixed: Vec<u8>, flex: Vec<u8>, available: u16, gap: u8) -> bool {
    let tracks: Vec<TrackSize> = fixed
        .iter()
        .map(|&px| TrackSize::fixed(f32::from(px)))
        .chain(flex.iter().map(|&fr| TrackSize::flex(f32::from(fr % 4 + 1))))
        .collect();
    let available = f32::from(available);
    let gap = f32::from(gap % 16);
    let sizing = resolve_tracks(&tracks, available, gap, &[], false);
    let used: f32 = sizing.sizes.iter().sum::<f32>() + total_gaps(tracks.len(), gap) + sizing.free_space;
    (used - available).abs() < 0.5 && sizing.sizes.iter().all(|&s| s >= 0.0)
}

// ========== content distribution ==========

#[quickcheck]
fn prop_distribution_conserves_leftover(count: u8, leftover: u16, keyword: u8) -> bool {
    let distribution = [
        ContentDistribution::End,
        ContentDistribution::Center,
        ContentDistribution::SpaceAround,
        ContentDistribution::SpaceEvenly,
    ][usize::from(keyword % 4)];
    let count = usize::from(count % 12) + 1;
    let leftover = i32::from(leftover);
    total_spacing(&distribute(distribution, count, leftover)) == leftover
}

#[quickcheck]
fn prop_space_between_conserves_leftover(count: u8, leftover: u16) -> bool {
    let count = usize::from(count % 12) + 2;
    let leftover = i32::from(leftover);
    let spacing = distribute(ContentDistribution::SpaceBetween, count, leftover);
    total_spacing(&spacing) == leftover && spacing[0].start == 0
}

#[test]
fn test_space_around_excess_pixels() {
    let spacing = distribute(ContentDistribution::SpaceAround, 2, 7);
    let sides: Vec<(i32, i32)> = spacing.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(sides, vec![(2, 2), (2, 1)]);
}

#[test]
fn test_negative_leftover_distributes_nothing() {
    let spacing = distribute(ContentDistribution::SpaceEvenly, 3, -40);
    assert_eq!(total_spacing(&spacing), 0);
}

// ========== list markers ==========

#[test]
fn test_markers_follow_list_style() {
    assert_eq!(marker(ListStyle::parse("disc"), 1), "●");
    assert_eq!(marker(ListStyle::parse("upper-roman"), 4), "IV.");
    assert_eq!(marker(ListStyle::parse("none"), 4), "");
}

// ========== text ==========

#[quickcheck]
fn prop_split_words_is_lossless(text: String) -> bool {
    split_words(&text).concat() == text
}

#[test]
fn test_partition_columns_balances_width() {
    let words = split_words("aaaa bbbb cccc dddd");
    let columns = partition_columns(&words, 2, &ApproximateTextMeasurer, 10.0);
    assert_eq!(columns, vec!["aaaa bbbb ".to_string(), "cccc dddd".to_string()]);
}

#[test]
fn test_partition_columns_drops_empty_buckets() {
    let words = split_words("single");
    let columns = partition_columns(&words, 3, &ApproximateTextMeasurer, 16.0);
    assert_eq!(columns, vec!["single".to_string()]);
}
