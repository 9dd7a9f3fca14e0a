//! Best-effort token correction for date queries.

/// Vocabulary that shows up in spoken dates. Order breaks distance ties.
pub const DATE_VOCABULARY: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december",
    "next", "this", "coming", "last", "today", "tonight", "tomorrow", "yesterday",
    "day", "days", "week", "weeks", "weekend", "month", "months", "year", "years",
    "from", "after", "before", "later", "ago", "now", "please",
    "morning", "afternoon", "evening", "noon",
];

/// Ordinary English words that sit within a typo of some date word. These
/// are never corrected.
pub const COMMON_WORDS: &[&str] = &[
    "and", "are", "can", "for", "his", "her", "how", "new", "not", "own", "say", "way",
    "was", "who", "why", "yes", "age", "ego", "man", "map", "pay", "sun", "son",
    "bay", "dad", "dry", "lay", "ray", "hay", "sat",
    "soon", "moon", "none", "noun", "neon", "near", "hear", "dear", "bear", "fear",
    "gear", "tear", "wear", "rear", "yeah", "text", "nest", "neat", "thus", "thin",
    "tips", "that", "them", "then", "they", "fast", "cast", "past", "vast", "lost",
    "list", "lust", "form", "know", "ways", "dads", "stay", "seek", "peek",
    "weak", "seed", "tune", "dune", "jane", "jury", "mind", "more", "most",
    "match", "marsh", "mouth", "mouths", "alter", "aster", "water", "hater", "layer",
    "latex", "liter", "tears", "wears", "bears", "hears", "fears", "gears", "seeks",
    "peeks", "least", "fridge", "sundae", "homing", "combing", "warning", "mourning",
    "pleased", "plead", "toady", "tidy", "morn", "evenings",
];

const MIN_TOKEN_LEN: usize = 3;
const MIN_CANDIDATE_LEN: usize = 4;

pub struct SpellCorrector {
    dictionary: &'static [&'static str],
}

impl Default for SpellCorrector {
    fn default() -> Self {
        Self::new(DATE_VOCABULARY)
    }
}

impl SpellCorrector {
    pub fn new(dictionary: &'static [&'static str]) -> Self {
        Self { dictionary }
    }

    /// Corrects each whitespace-delimited token independently and rejoins
    /// them with single spaces.
    pub fn correct(&self, query: &str) -> String {
        query
            .split_whitespace()
            .map(|token| self.correct_token(token).unwrap_or_else(|| token.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The closest dictionary word when it differs from `token`, else `None`.
    pub fn correct_token(&self, token: &str) -> Option<String> {
        if token.len() < MIN_TOKEN_LEN || !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let lower = token.to_ascii_lowercase();
        if self.dictionary.contains(&lower.as_str()) || COMMON_WORDS.contains(&lower.as_str()) {
            return None;
        }
        let first = lower.chars().next()?;

        let max_distance = if lower.len() <= 5 { 1 } else { 2 };
        let mut best: Option<(&str, usize)> = None;
        for &word in self.dictionary {
            // A misspelling keeps its first letter.
            if word.len() < MIN_CANDIDATE_LEN || !word.starts_with(first) {
                continue;
            }
            let distance = strsim::damerau_levenshtein(&lower, word);
            if distance > max_distance {
                continue;
            }
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((word, distance));
            }
        }

        best.map(|(word, _)| word.to_string())
    }
}
