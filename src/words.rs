//! Word-frequency counting on top of [`BalancedTree`].

use std::io::BufRead;

use log::debug;

use crate::error::Result;
use crate::map::BalancedTree;

/// Occurrence count per normalized word.
pub type WordCounts = BalancedTree<String, u32>;

/// Tally of one [`count_words`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountSummary {
    /// Tokens that normalized to a word and were counted.
    pub counted: usize,
    /// Tokens without any letter, e.g. numbers or punctuation.
    pub skipped: usize,
}

/// Keeps the ASCII letters of `word`, lowercased, and drops everything else.
///
/// ```
/// use avl_wordfreq::keep_only_letters;
/// assert_eq!(keep_only_letters("Don't!"), "dont");
/// assert_eq!(keep_only_letters("1984"), "");
/// ```
pub fn keep_only_letters(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Reads `reader` line by line and adds every whitespace separated word to `counts`.
///
/// Words are normalized with [`keep_only_letters`]. A word seen for the first
/// time is inserted with count 1, later occurrences increment its count.
pub fn count_words<R: BufRead>(reader: R, counts: &mut WordCounts) -> Result<CountSummary> {
    let mut summary = CountSummary::default();
    for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            let word = keep_only_letters(token);
            if word.is_empty() {
                debug!("skipping token without letters: {:?}", token);
                summary.skipped += 1;
                continue;
            }
            counts.upsert(word, 1, |count| *count += 1);
            summary.counted += 1;
        }
    }
    debug!(
        "counted {} words ({} distinct), skipped {} tokens",
        summary.counted,
        counts.len(),
        summary.skipped
    );
    Ok(summary)
}
