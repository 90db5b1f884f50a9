//! Text measurement and word splitting.

use std::sync::LazyLock;

use regex::Regex;

/// Font metrics interface for text measurement.
///
/// Abstracts over different font backends. The pipeline only needs advance
/// widths and a line height to decide where text reflows.
pub trait TextMeasurer {
    /// Total advance width of `text` at `font_size`.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Line height for `line-height: normal`.
    fn line_height(&self, font_size: f32) -> f32;
}

/// Fixed-ratio metrics for when no font data is available.
///
/// The average advance of Latin glyphs in a proportional font is roughly
/// 0.6× the font size; line height uses 1.2×.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasurer;

impl TextMeasurer for ApproximateTextMeasurer {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }

    fn line_height(&self, font_size: f32) -> f32 {
        font_size * 1.2
    }
}

/// A word with its trailing whitespace, or a whitespace run.
static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+\s*|\s+").expect("BUG: invalid WORD regex literal")
});

/// Splits text into word segments. Each segment keeps the whitespace that
/// follows it, so concatenating the segments yields the input unchanged.
#[must_use]
pub fn split_words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Partitions words into at most `columns` contiguous buckets of similar
/// measured width. There are never more buckets than words, and empty
/// buckets are dropped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn partition_columns(
    words: &[&str],
    columns: usize,
    measurer: &dyn TextMeasurer,
    font_size: f32,
) -> Vec<String> {
    let columns = columns.clamp(1, words.len().max(1));
    let widths: Vec<f32> = words
        .iter()
        .map(|word| measurer.text_width(word, font_size))
        .collect();
    let total: f32 = widths.iter().sum();
    let mut buckets = vec![String::new(); columns];
    if total <= 0.0 {
        buckets[0] = words.concat();
    } else {
        let target = total / columns as f32;
        let mut offset = 0.0;
        for (word, width) in words.iter().zip(&widths) {
            let middle = offset + width / 2.0;
            let index = ((middle / target) as usize).min(columns - 1);
            buckets[index].push_str(word);
            offset += width;
        }
    }
    buckets.retain(|bucket| !bucket.is_empty());
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_trailing_whitespace() {
        assert_eq!(split_words("  Hello, world! "), vec!["  ", "Hello, ", "world! "]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_partition_columns_balanced() {
        let words = split_words("aa bb cc dd ");
        let columns = partition_columns(&words, 2, &ApproximateTextMeasurer, 10.0);
        assert_eq!(columns, vec!["aa bb ", "cc dd "]);
    }

    #[test]
    fn test_partition_column_count_is_bounded_by_words() {
        let words = split_words("a b c");
        let columns = partition_columns(&words, usize::MAX, &ApproximateTextMeasurer, 10.0);
        assert_eq!(columns, vec!["a ", "b ", "c"]);
    }

    #[test]
    fn test_partition_more_columns_than_words() {
        let words = split_words("one");
        let columns = partition_columns(&words, 3, &ApproximateTextMeasurer, 10.0);
        assert_eq!(columns, vec!["one"]);
    }
}
