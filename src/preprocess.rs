//! Text preprocessing: tokenization and token filtering.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

/// English stopwords.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Options for `process_text`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProcessOptions {
    /// Lowercase the text before tokenization.
    pub lower: bool,

    /// Remove English stopwords.
    pub remove_stopwords: bool,

    /// Remove punctuation tokens.
    pub remove_punctuation: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            lower: true,
            remove_stopwords: true,
            remove_punctuation: true,
        }
    }
}

/// Split text into word and punctuation tokens.
///
/// Runs of alphanumeric characters form words, apostrophes between
/// alphanumeric characters are kept inside words (*o'clock*). Clitics
/// are split off in the Penn Treebank manner: *don't* becomes *do*
/// *n't* and *cat's* becomes *cat* *'s*. Every other non-whitespace
/// character is a token of its own.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<_> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();

    for (idx, &c) in chars.iter().enumerate() {
        let inner_apostrophe = c == '\''
            && !word.is_empty()
            && chars.get(idx + 1).map_or(false, |next| next.is_alphanumeric());

        if c.is_alphanumeric() || inner_apostrophe {
            word.push(c);
            continue;
        }

        if !word.is_empty() {
            push_word(&mut tokens, std::mem::take(&mut word));
        }

        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }

    if !word.is_empty() {
        push_word(&mut tokens, word);
    }

    tokens
}

const CLITICS: &[&str] = &["'s", "'re", "'ll", "'ve", "'d", "'m"];

fn push_word(tokens: &mut Vec<String>, mut word: String) {
    let split = if word.len() > 3
        && word.is_char_boundary(word.len() - 3)
        && word[word.len() - 3..].eq_ignore_ascii_case("n't")
    {
        Some(word.len() - 3)
    } else {
        word.rfind('\'').filter(|&idx| {
            idx > 0
                && CLITICS
                    .iter()
                    .any(|clitic| word[idx..].eq_ignore_ascii_case(clitic))
        })
    };

    match split {
        Some(idx) => {
            let clitic = word.split_off(idx);
            tokens.push(word);
            tokens.push(clitic);
        }
        None => tokens.push(word),
    }
}

fn is_punctuation(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_punctuation(),
        _ => false,
    }
}

/// Tokenize text and remove unwanted tokens.
pub fn process_text(text: &str, options: ProcessOptions) -> Vec<String> {
    let text = if options.lower {
        text.to_lowercase()
    } else {
        text.to_owned()
    };

    let stopwords: HashSet<&str> = if options.remove_stopwords {
        ENGLISH_STOPWORDS.iter().cloned().collect()
    } else {
        HashSet::new()
    };

    tokenize(&text)
        .into_iter()
        .filter(|token| !(options.remove_punctuation && is_punctuation(token)))
        .filter(|token| !stopwords.contains(token.as_str()))
        .collect()
}

/// Remove every token that is in `to_remove`.
pub fn filter_tokens<T, R>(tokens: &[T], to_remove: &[R]) -> Vec<String>
where
    T: AsRef<str>,
    R: AsRef<str>,
{
    let to_remove: HashSet<&str> = to_remove.iter().map(AsRef::as_ref).collect();
    tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|token| !to_remove.contains(token))
        .map(ToOwned::to_owned)
        .collect()
}

/// Join items with a comma and a space.
pub fn list_to_string<T>(items: &[T]) -> String
where
    T: AsRef<str>,
{
    items.iter().map(AsRef::as_ref).join(", ")
}

/// Partition of a token sequence by frequency.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RareTokens {
    /// Tokens below the minimum frequency, followed by the frequent
    /// tokens that did not fit in the selection.
    pub rare: Vec<String>,

    /// The most frequent tokens, most frequent first.
    pub selected: Vec<String>,
}

/// Split the distinct tokens into rare and selected tokens.
///
/// Tokens that occur fewer than `min_freq` times are rare. Of the
/// remaining tokens, the `max_tokens` most frequent are selected, the
/// others are also rare. Tokens with equal frequencies are ordered by
/// first occurrence.
pub fn rare_tokens<T>(tokens: &[T], min_freq: usize, max_tokens: usize) -> RareTokens
where
    T: AsRef<str>,
{
    let mut order = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens.iter().map(AsRef::as_ref) {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let (mut frequent, rare): (Vec<_>, Vec<_>) = order
        .into_iter()
        .map(|token| (token, counts[token]))
        .partition(|&(_, count)| count >= min_freq);

    frequent.sort_by(|(_, count1), (_, count2)| count2.cmp(count1));

    let mut result = RareTokens {
        rare: rare.into_iter().map(|(token, _)| token.to_owned()).collect(),
        selected: Vec::with_capacity(max_tokens.min(frequent.len())),
    };

    for (idx, (token, _)) in frequent.into_iter().enumerate() {
        if idx < max_tokens {
            result.selected.push(token.to_owned());
        } else {
            result.rare.push(token.to_owned());
        }
    }

    result
}
