use std::collections::{HashMap, HashSet};

use jieba_rs::Jieba;
use regex::Regex;

/// Splits raw text into the tokens fed to frequency analysis.
///
/// Runs of word characters are segmented further with jieba so CJK text
/// yields words rather than whole sentences.
pub struct Tokenizer {
    //分词正则
    regex: Regex,
    pub jieba: Jieba,
    pub filter: HashSet<String>,
    pub min_word_length: usize,
    pub exclude_numbers: bool,
    pub lowercase: bool,
    pub merge_case: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        let regex = Regex::new("\\w[\\w']*").expect("Unable to compile tokenization regex");

        Tokenizer {
            regex,
            jieba: Jieba::new(),
            filter: Default::default(),
            min_word_length: 0,
            exclude_numbers: true,
            lowercase: false,
            merge_case: false,
        }
    }
}

impl Tokenizer {
    pub fn with_word(mut self, word: &str) -> Self {
        self.jieba.add_word(word, None, None);
        self
    }

    pub fn with_min_word_length(mut self, size: usize) -> Self {
        self.min_word_length = size;
        self
    }

    pub fn with_filter<S: AsRef<str>>(mut self, value: &[S]) -> Self {
        self.filter = value.iter().map(|el| el.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_exclude_numbers(mut self, value: bool) -> Self {
        self.exclude_numbers = value;
        self
    }

    pub fn with_lowercase(mut self, value: bool) -> Self {
        self.lowercase = value;
        self
    }

    /// Spell every case variant of a word the way it is spelled most often.
    pub fn with_merge_case(mut self, value: bool) -> Self {
        self.merge_case = value;
        self
    }

    fn words<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.regex
            .find_iter(text)
            .map(|mat| mat.as_str())
            .flat_map(move |chunk| self.jieba.cut(chunk, false))
            .map(str::trim)
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .filter(move |word| {
                self.min_word_length == 0 || word.chars().count() >= self.min_word_length
            })
            .filter(move |word| !(self.exclude_numbers && word.chars().all(char::is_numeric)))
            .filter(move |word| self.filter.is_empty() || !self.filter.contains(&word.to_lowercase()))
    }

    /// Tokens in text order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = self.words(text).collect();

        if self.lowercase {
            return words.into_iter().map(str::to_lowercase).collect();
        }
        if self.merge_case {
            return Self::keep_common_case(&words);
        }

        words.into_iter().map(str::to_string).collect()
    }

    fn keep_common_case(words: &[&str]) -> Vec<String> {
        let mut counts = HashMap::<&str, usize>::new();
        for word in words {
            *counts.entry(*word).or_insert(0) += 1;
        }

        // Per lowercase key, the most frequent spelling; first seen wins ties.
        let mut common_cases = HashMap::<String, &str>::new();
        for word in words {
            let best = common_cases.entry(word.to_lowercase()).or_insert(*word);
            if counts[word] > counts[&*best] {
                *best = *word;
            }
        }

        words
            .iter()
            .map(|word| common_cases[&word.to_lowercase()].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Tokenizer;

    #[test]
    fn splits_latin_text() {
        let tokens = Tokenizer::default().tokenize("The borrow checker, the borrow checker!");
        assert_eq!(
            tokens,
            ["The", "borrow", "checker", "the", "borrow", "checker"]
        );
    }

    #[test]
    fn segments_chinese() {
        let tokens = Tokenizer::default()
            .with_min_word_length(2)
            .tokenize("我们中出了一个叛徒");
        assert!(tokens.iter().all(|t| t.chars().count() >= 2));
        assert!(tokens.contains(&"叛徒".to_string()));
    }

    #[test]
    fn filters_numbers_and_stop_words() {
        let tokens = Tokenizer::default()
            .with_filter(&["The"])
            .tokenize("the 2024 report and THE 42 results");
        assert_eq!(tokens, ["report", "and", "results"]);

        let tokens = Tokenizer::default()
            .with_exclude_numbers(false)
            .tokenize("route 66");
        assert_eq!(tokens, ["route", "66"]);
    }

    #[test]
    fn case_handling() {
        let text = "Rust rust RUST Rust";

        let lower = Tokenizer::default().with_lowercase(true).tokenize(text);
        assert_eq!(lower, ["rust"; 4]);

        let merged = Tokenizer::default().with_merge_case(true).tokenize(text);
        assert_eq!(merged, ["Rust"; 4]);

        let exact = Tokenizer::default().tokenize(text);
        assert_eq!(exact, ["Rust", "rust", "RUST", "Rust"]);
    }
}
