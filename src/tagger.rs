//! Word tokenizer and part-of-speech tagger seam.
//!
//! The pipeline only needs (word, tag, trailing whitespace) triples; any
//! tagger producing Penn-style tags can be plugged in. [`RuleTagger`] is the
//! bundled closed-class-plus-suffix implementation.

use crate::g2p::vocab::{CURRENCIES, PUNCTS};

/// Segments text into (word, POS tag, trailing whitespace) triples.
/// Concatenating `word + whitespace` over the output must reproduce the
/// input byte for byte.
pub trait Tagger: Send + Sync {
    fn segment(&self, text: &str) -> Vec<(String, String, String)>;
}

const DETERMINERS: [&str; 7] = ["a", "an", "the", "this", "that", "these", "those"];
const PREPOSITIONS: [&str; 10] = [
    "in", "on", "at", "of", "for", "with", "by", "from", "vs", "vs.",
];
const PRONOUNS: [&str; 7] = ["i", "you", "he", "she", "it", "we", "they"];
const CONJUNCTIONS: [&str; 3] = ["and", "or", "but"];
const MODALS: [&str; 9] = [
    "can", "could", "will", "would", "shall", "should", "may", "might", "must",
];

fn is_peelable(c: char) -> bool {
    PUNCTS.contains(c) || matches!(c, '(' | ')' | '[' | ']' | '{' | '}')
}

fn is_numeric(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-') || CURRENCIES.contains_key(&c))
}

/// Keeps the trailing dot attached for initialisms ("U.S.") and one or two
/// letter abbreviations ("Dr.").
fn keeps_abbrev_dot(word: &str) -> bool {
    if !word.ends_with('.') {
        return false;
    }
    let core: Vec<char> = word.chars().collect();
    let dotted = core
        .chunks(2)
        .all(|p| p.len() == 2 && p[0].is_alphabetic() && p[1] == '.');
    let short = {
        let stem = &word[..word.len() - 1];
        !stem.is_empty() && stem.len() <= 2 && stem.chars().all(char::is_alphabetic)
    };
    dotted || short
}

/// Closed-class lists, numeral shapes, capitalization and suffix heuristics.
/// Coarse, but enough to drive tag-sensitive lexicon entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleTagger;

impl RuleTagger {
    fn tag_word(&self, word: &str, sentence_start: bool) -> String {
        let lower = word.to_lowercase();
        if word.chars().count() == 1 {
            let c = word.chars().next().unwrap();
            if CURRENCIES.contains_key(&c) {
                return "$".into();
            }
            if is_peelable(c) || c == '\'' || c == '"' {
                return word.into();
            }
        }
        if is_numeric(word) {
            return "CD".into();
        }
        if lower == "to" {
            return "TO".into();
        }
        if DETERMINERS.contains(&lower.as_str()) {
            return "DT".into();
        }
        if PREPOSITIONS.contains(&lower.as_str()) {
            return "IN".into();
        }
        if PRONOUNS.contains(&lower.as_str()) {
            return "PRP".into();
        }
        if CONJUNCTIONS.contains(&lower.as_str()) {
            return "CC".into();
        }
        if MODALS.contains(&lower.as_str()) {
            return "MD".into();
        }
        if !sentence_start && word.chars().next().is_some_and(char::is_uppercase) {
            return "NNP".into();
        }
        if lower.len() > 3 && lower.ends_with("ed") {
            return "VBD".into();
        }
        if lower.len() > 5 && lower.ends_with("ing") {
            return "VBG".into();
        }
        if lower.len() > 4 && lower.ends_with("ly") {
            return "RB".into();
        }
        "NN".into()
    }
}

impl Tagger for RuleTagger {
    fn segment(&self, text: &str) -> Vec<(String, String, String)> {
        let mut out: Vec<(String, String, String)> = Vec::new();
        let mut sentence_start = true;
        let mut chars = text.chars().peekable();

        while chars.peek().is_some() {
            let mut chunk = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                chunk.push(c);
                chars.next();
            }
            let mut ws = String::new();
            while let Some(&c) = chars.peek() {
                if !c.is_whitespace() {
                    break;
                }
                ws.push(c);
                chars.next();
            }
            if chunk.is_empty() {
                // Leading whitespace attaches to the previous token if any.
                if let Some(last) = out.last_mut() {
                    last.2.push_str(&ws);
                }
                continue;
            }

            // Peel punctuation off both ends; the core keeps its dot only
            // for abbreviation shapes.
            let mut leading: Vec<char> = Vec::new();
            let mut core = chunk.as_str();
            while let Some(c) = core.chars().next() {
                if is_peelable(c) && core.chars().count() > 1 {
                    leading.push(c);
                    core = &core[c.len_utf8()..];
                } else {
                    break;
                }
            }
            let mut trailing: Vec<char> = Vec::new();
            while let Some(c) = core.chars().last() {
                if is_peelable(c) && core.chars().count() > 1 {
                    if c == '.' && keeps_abbrev_dot(core) {
                        break;
                    }
                    trailing.push(c);
                    core = &core[..core.len() - c.len_utf8()];
                } else {
                    break;
                }
            }
            trailing.reverse();

            for c in &leading {
                out.push((c.to_string(), c.to_string(), String::new()));
            }
            let tag = self.tag_word(core, sentence_start);
            out.push((core.to_string(), tag, String::new()));
            for c in &trailing {
                out.push((c.to_string(), c.to_string(), String::new()));
            }
            if let Some(last) = out.last_mut() {
                last.2 = ws;
            }

            let chunk_end = trailing.last().copied().or_else(|| core.chars().last());
            sentence_start = matches!(chunk_end, Some('.' | '!' | '?'))
                || (core.ends_with('.') && trailing.is_empty());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Vec<(String, String, String)> {
        RuleTagger.segment(text)
    }

    #[test]
    fn whitespace_round_trips() {
        for text in ["a cat.", "  hello,  world ", "Dr. Smith\nwrote."] {
            let joined: String = seg(text)
                .into_iter()
                .map(|(w, _, ws)| format!("{w}{ws}"))
                .collect();
            assert_eq!(joined, text.trim_start());
        }
    }

    #[test]
    fn closed_classes_and_suffixes() {
        let tags: Vec<(String, String)> = seg("The cat walked slowly to town")
            .into_iter()
            .map(|(w, t, _)| (w, t))
            .collect();
        let find = |w: &str| tags.iter().find(|(x, _)| x == w).unwrap().1.clone();
        assert_eq!(find("The"), "DT");
        assert_eq!(find("walked"), "VBD");
        assert_eq!(find("slowly"), "RB");
        assert_eq!(find("to"), "TO");
    }

    #[test]
    fn abbreviations_keep_their_dot() {
        let words: Vec<String> = seg("Dr. Smith met Mrs. Jones.")
            .into_iter()
            .map(|(w, _, _)| w)
            .collect();
        assert!(words.contains(&"Dr.".to_string()));
        assert!(words.contains(&"Mrs".to_string())); // three letters: dot peeled
        assert!(words.contains(&"Smith".to_string()));
    }

    #[test]
    fn capitalized_mid_sentence_is_proper() {
        let tags: Vec<(String, String)> = seg("we saw Paris")
            .into_iter()
            .map(|(w, t, _)| (w, t))
            .collect();
        assert_eq!(tags.last().unwrap().1, "NNP");
    }

    #[test]
    fn numerals_and_currency() {
        let toks = seg("$19.99 in 1999");
        assert_eq!(toks[0].0, "$19.99");
        assert_eq!(toks[0].1, "CD");
        assert_eq!(toks[2].1, "CD");
    }
}
