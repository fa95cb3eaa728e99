//! Last-resort resolution for tokens the dictionary cannot place: literal
//! punctuation and symbols, numeral reading, a pluggable neural model, and
//! finally Unicode character names read as words.

use crate::g2p::lexicon::{Lexicon, RATING_GUESS, RATING_LEXICON};
use crate::g2p::number::is_number;
use crate::g2p::retokenize::punct_phonemes;
use crate::g2p::stress::apply_stress;
use crate::g2p::token::Token;
use crate::g2p::vocab::SYMBOLS;

/// A learned grapheme-to-phoneme model consulted for words the dictionary
/// misses. Must be deterministic for identical input.
pub trait FallbackModel: Send + Sync {
    /// Best-effort phonemes plus a confidence rating (lower is better).
    fn infer(&self, word: &str, tag: &str) -> Option<(String, i32)>;
}

/// Model stub for dictionary-only operation; never answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullModel;

impl FallbackModel for NullModel {
    fn infer(&self, _word: &str, _tag: &str) -> Option<(String, i32)> {
        None
    }
}

pub(crate) fn token_fallback(
    lexicon: &Lexicon,
    model: &dyn FallbackModel,
    token: &Token,
) -> (Option<String>, Option<i32>) {
    let word = token.alias.as_deref().unwrap_or(&token.text);
    if let Some(ps) = punct_phonemes(word) {
        return (Some(ps), Some(RATING_LEXICON));
    }
    if let Some(&replacement) = SYMBOLS.get(word) {
        return lexicon.lookup(replacement, &token.tag, None, None);
    }
    if is_number(word, token.is_head) {
        let (ps, rating) = lexicon.get_number(
            word,
            token.currency.as_deref(),
            token.is_head,
            &token.num_flags,
        );
        if ps.is_some() {
            return (ps, rating);
        }
    }
    if !word.is_empty() && word.chars().all(char::is_alphabetic) {
        // Single letters and all-caps proper nouns spell out; the model
        // would mangle them.
        if word.chars().count() == 1 || (token.tag == "NNP" && word == word.to_uppercase()) {
            return lexicon.get_nnp(word);
        }
        if let Some((ps, rating)) = model.infer(word, &token.tag) {
            return (Some(apply_stress(&ps, token.stress)), Some(rating));
        }
        let (ps, rating) = lexicon.get_nnp(word);
        if ps.is_some() {
            return (ps, rating);
        }
    }
    // Read each character's Unicode name as words, if all of them resolve.
    let mut out: Vec<String> = Vec::new();
    for c in word.chars() {
        let Some(name) = unicode_names2::name(c) else {
            return (None, None);
        };
        let name = name.to_string().to_lowercase();
        for w in name.split(|ch: char| !ch.is_ascii_alphabetic()) {
            if w.is_empty() {
                continue;
            }
            // Only listed headwords count here; lookup's letter spelling
            // for initialisms would turn any miss into garbage.
            if !lexicon.contains(w) {
                return (None, None);
            }
            match lexicon.lookup(w, "", None, None).0 {
                Some(ps) => out.push(ps),
                None => return (None, None),
            }
        }
    }
    if out.is_empty() {
        (None, None)
    } else {
        (Some(out.join(" ")), Some(RATING_GUESS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speller::EnglishSpeller;

    fn us() -> Lexicon {
        Lexicon::english(false, Box::new(EnglishSpeller)).unwrap()
    }

    #[test]
    fn null_model_never_answers() {
        assert_eq!(NullModel.infer("anything", "NN"), None);
    }

    #[test]
    fn symbols_resolve_to_words() {
        let lex = us();
        let tk = Token::new("&", "CC", " ");
        let (ps, _) = token_fallback(&lex, &NullModel, &tk);
        assert_eq!(ps.as_deref(), Some("ænd"));
    }

    #[test]
    fn all_caps_proper_noun_spells_out() {
        let lex = us();
        let mut tk = Token::new("NASA", "NNP", " ");
        tk.is_head = true;
        let (ps, _) = token_fallback(&lex, &NullModel, &tk);
        let ps = ps.unwrap();
        assert!(ps.contains('ˈ'), "{ps}");
        assert!(ps.starts_with("ˌɛn"), "{ps}");
    }

    #[test]
    fn model_answer_is_used_for_unknown_words() {
        struct Fixed;
        impl FallbackModel for Fixed {
            fn infer(&self, _w: &str, _t: &str) -> Option<(String, i32)> {
                Some(("fˈubɑɹ".into(), crate::g2p::lexicon::RATING_MODEL))
            }
        }
        let lex = us();
        let tk = Token::new("foobar", "NN", "");
        let (ps, rating) = token_fallback(&lex, &Fixed, &tk);
        assert_eq!(ps.as_deref(), Some("fˈubɑɹ"));
        assert_eq!(rating, Some(crate::g2p::lexicon::RATING_MODEL));
    }

    #[test]
    fn character_names_read_when_every_word_is_listed() {
        let lex = us();
        // U+2212 MINUS SIGN: both name words are dictionary headwords.
        let tk = Token::new("−", "NN", "");
        let (ps, rating) = token_fallback(&lex, &NullModel, &tk);
        assert_eq!(ps.as_deref(), Some("mˈInəs sˈIn"));
        assert_eq!(rating, Some(RATING_GUESS));
    }

    #[test]
    fn unresolvable_symbol_stays_unknown() {
        let lex = us();
        let tk = Token::new("~", "NN", "");
        let (ps, rating) = token_fallback(&lex, &NullModel, &tk);
        // "tilde" is not a dictionary word, so the name path fails too.
        assert_eq!(ps, None);
        assert_eq!(rating, None);
    }
}
