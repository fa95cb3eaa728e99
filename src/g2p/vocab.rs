use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Primary stress mark, placed immediately before the stressed vowel.
pub const PRIMARY_STRESS: char = 'ˈ';
/// Secondary stress mark.
pub const SECONDARY_STRESS: char = 'ˌ';

/// Marker emitted for tokens that could not be resolved at all.
pub const UNKNOWN_PHONEMES: &str = "❓";

// Capital letters are single-symbol diphthongs in the Kokoro alphabet:
// A=eɪ I=aɪ O=oʊ(US) Q=əʊ(GB) W=aʊ Y=ɔɪ.
const US_VOCAB_STR: &str = "AIOWYbdfhijklmnpstuvwzæðŋɐɑɔəɚɛɜɡɪɹʃʊʌʒʤʧθᵊᵻɾʔ";
const GB_VOCAB_STR: &str = "AIQWYabdfhijklmnpstuvwzðŋɐɑɒɔəɛɜɡɪɹʃʊʌʒʤʧθᵊː";

const VOWELS_STR: &str = "AIOQWYaiuæɑɒɔəɚɛɜɪʊʌᵻ";
const CONSONANTS_STR: &str = "bdfhjklmnpstvwzðŋɡɹʃʒʤʧθ";
// Weighted double when ranking stress candidates.
const DIPHTHONGS_STR: &str = "AIOQWYʤʧ";
// Sounds that allow the American flap-t in -ed/-ing suffixes.
const US_TAUS_STR: &str = "AIOWYiuæɑəɚɛɪɹʊʌ";

pub const PUNCTS: &str = ";:,.!?¡¿—…\"«»“”";
pub const NON_QUOTE_PUNCTS: &str = ";:,.!?¡¿—…";
pub const SUBTOKEN_JUNKS: &str = "',-._‘’/";

lazy_static! {
    static ref US_VOCAB: HashSet<char> = US_VOCAB_STR.chars().collect();
    static ref GB_VOCAB: HashSet<char> = GB_VOCAB_STR.chars().collect();
    static ref VOWELS: HashSet<char> = VOWELS_STR.chars().collect();
    static ref CONSONANTS: HashSet<char> = CONSONANTS_STR.chars().collect();
    static ref DIPHTHONGS: HashSet<char> = DIPHTHONGS_STR.chars().collect();
    static ref US_TAUS: HashSet<char> = US_TAUS_STR.chars().collect();

    /// Currency symbol to (major unit, minor unit) word pairs.
    pub static ref CURRENCIES: HashMap<char, (&'static str, &'static str)> = {
        let mut m = HashMap::new();
        m.insert('$', ("dollar", "cent"));
        m.insert('£', ("pound", "pence"));
        m.insert('€', ("euro", "cent"));
        m
    };

    /// Standalone symbols read as words.
    pub static ref SYMBOLS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("%", "percent");
        m.insert("&", "and");
        m.insert("+", "plus");
        m.insert("@", "at");
        m
    };

    /// Symbols read as words only under an ADD-style tag.
    pub static ref ADD_SYMBOLS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert(".", "dot");
        m.insert("/", "slash");
        m
    };
}

pub fn vocab(british: bool) -> &'static HashSet<char> {
    if british {
        &GB_VOCAB
    } else {
        &US_VOCAB
    }
}

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

pub fn is_consonant(c: char) -> bool {
    CONSONANTS.contains(&c)
}

pub fn is_diphthong(c: char) -> bool {
    DIPHTHONGS.contains(&c)
}

pub fn is_us_tau(c: char) -> bool {
    US_TAUS.contains(&c)
}

pub fn is_stress(c: char) -> bool {
    c == PRIMARY_STRESS || c == SECONDARY_STRESS
}

pub fn is_punct(c: char) -> bool {
    PUNCTS.contains(c)
}

pub fn is_non_quote_punct(c: char) -> bool {
    NON_QUOTE_PUNCTS.contains(c)
}

pub fn is_junk(c: char) -> bool {
    SUBTOKEN_JUNKS.contains(c)
}

pub fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '‘' | '’')
}

/// Whether a phoneme string is valid against the US or GB alphabet.
/// Stress marks and spaces are permitted in any entry.
pub fn in_vocab(ps: &str, british: bool) -> bool {
    ps.chars()
        .all(|c| c == ' ' || is_stress(c) || vocab(british).contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocab_membership() {
        assert!(in_vocab("kˈæt", false));
        assert!(in_vocab("nˌIntˈin dˈɑlɚz", false));
        assert!(!in_vocab("kˈæt", true)); // æ is US-only
        assert!(!in_vocab("hello", false)); // plain latin letters are not phonemes
    }

    #[test]
    fn char_classes() {
        assert!(is_vowel('æ'));
        assert!(is_consonant('ʧ'));
        assert!(is_diphthong('A'));
        assert!(!is_vowel('ˈ'));
    }
}
