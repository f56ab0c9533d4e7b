use std::collections::HashMap;

/// A word and how often it occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedWord {
    pub word: String,
    pub frequency: u32,
}

impl RankedWord {
    pub fn new(word: impl Into<String>, frequency: u32) -> Self {
        RankedWord {
            word: word.into(),
            frequency,
        }
    }
}

/// Counts exact token occurrences and ranks them by descending count.
///
/// Ties keep the order in which the words first appeared. The result holds at
/// most `max_words` entries and is empty when `tokens` is.
pub fn analyze<I, S>(tokens: I, max_words: usize) -> Vec<RankedWord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<RankedWord> = vec![];

    for token in tokens {
        let token = token.as_ref();
        match index.get(token) {
            Some(&slot) => ranked[slot].frequency += 1,
            None => {
                index.insert(token.to_string(), ranked.len());
                ranked.push(RankedWord::new(token, 1));
            }
        }
    }

    // `sort_by` is stable, so first-seen order survives among equal counts.
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(max_words);

    ranked
}
