use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Maximal runs of Unicode word characters (letters, digits, underscore)
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern must compile"));

/// Occurrences of one token and its share of all counted tokens.
/// Serialized as `[count, percentage]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u64, f64)", into = "(u64, f64)")]
pub struct WordStat {
    pub count: u64,
    pub percentage: f64,
}

impl From<(u64, f64)> for WordStat {
    fn from((count, percentage): (u64, f64)) -> Self {
        Self { count, percentage }
    }
}

impl From<WordStat> for (u64, f64) {
    fn from(stat: WordStat) -> Self {
        (stat.count, stat.percentage)
    }
}

/// Token -> (count, percentage), ordered by token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordFrequencyTable(BTreeMap<String, WordStat>);

impl WordFrequencyTable {
    pub fn get(&self, token: &str) -> Option<&WordStat> {
        self.0.get(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WordStat)> {
        self.0.iter()
    }

    /// Sum of all counts, i.e. the number of tokens that were not ignored
    pub fn total_tokens(&self) -> u64 {
        self.0.values().map(|stat| stat.count).sum()
    }

    /// Entries whose percentage is strictly above `min_percentage`.
    /// Percentages are kept as computed over the full table.
    pub fn filter_by_percentile(&self, min_percentage: f64) -> WordFrequencyTable {
        self.0
            .iter()
            .filter(|(_, stat)| stat.percentage > min_percentage)
            .map(|(token, stat)| (token.clone(), *stat))
            .collect()
    }
}

impl FromIterator<(String, WordStat)> for WordFrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, WordStat)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lowercased word tokens of `text`, in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// One decimal, ties to even on the exact binary value
fn round_to_tenth(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Counts word tokens across `texts`.
///
/// Tokens listed in `ignore_list` (compared case-insensitively) are left out
/// of both the counts and the total. When nothing is counted the table is
/// empty.
pub fn count_words<S: AsRef<str>>(texts: &[S], ignore_list: Option<&[String]>) -> WordFrequencyTable {
    let ignored: HashSet<String> = ignore_list
        .unwrap_or_default()
        .iter()
        .map(|word| word.to_lowercase())
        .collect();

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut total: u64 = 0;

    for text in texts {
        for token in tokenize(text.as_ref()) {
            if ignored.contains(&token) {
                continue;
            }
            total += 1;
            *counts.entry(token).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(token, count)| {
            let percentage = round_to_tenth(count as f64 / total as f64 * 100.0);
            (token, WordStat { count, percentage })
        })
        .collect()
}

/// Free-function form of [`WordFrequencyTable::filter_by_percentile`]
pub fn filter_by_percentile(table: &WordFrequencyTable, min_percentage: f64) -> WordFrequencyTable {
    table.filter_by_percentile(min_percentage)
}
