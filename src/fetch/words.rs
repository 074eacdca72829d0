use rand::seq::SliceRandom;

/// Bundled word list for the random-word commands; one word per line.
const WORD_FILE: &str = include_str!("words.txt");

fn words() -> Vec<&'static str> {
    WORD_FILE
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
        .collect()
}

pub fn random_word() -> Option<&'static str> {
    words().choose(&mut rand::thread_rng()).copied()
}

/// `count` words drawn with replacement, matching the original behavior of
/// independent picks rather than a shuffle.
pub fn random_words(count: usize) -> Vec<&'static str> {
    let pool = words();
    let mut rng = rand::thread_rng();
    (0..count)
        .filter_map(|_| pool.choose(&mut rng).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_list_is_not_empty() {
        assert!(!words().is_empty());
    }

    #[test]
    fn random_words_returns_requested_count() {
        assert_eq!(random_words(7).len(), 7);
        assert!(random_words(0).is_empty());
    }

    #[test]
    fn words_are_plain_ascii() {
        for word in words() {
            assert!(word.chars().all(|c| c.is_ascii_alphabetic()), "{}", word);
        }
    }
}
