//! Dictionary lookup, fixed special-case pronunciations, and -s/-ed/-ing
//! stemming. Number verbalization lives in `number.rs` as a second impl
//! block on [`Lexicon`].

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::g2p::number::is_number;
use crate::g2p::stress::apply_stress;
use crate::g2p::token::{Token, TokenContext};
use crate::g2p::vocab::{
    in_vocab, is_us_tau, ADD_SYMBOLS, PRIMARY_STRESS, SECONDARY_STRESS, SYMBOLS,
};
use crate::g2p::G2pError;
use crate::speller::NumberSpeller;

/// Pronunciation confidence: lower is better, `None` is unrated.
pub const RATING_OVERRIDE: i32 = 1;
pub const RATING_LEXICON: i32 = 2;
pub const RATING_DERIVED: i32 = 3;
pub const RATING_MODEL: i32 = 4;
pub const RATING_GUESS: i32 = 5;

/// Stress overrides for (Capitalized, ALL-CAPS) spellings.
pub const CAP_STRESSES: (f32, f32) = (0.5, 2.0);

lazy_static! {
    static ref VS_RE: Regex = Regex::new(r"(?i)^vs\.?$").unwrap();
}

/// A headword's pronunciation: either unconditional, or selected by POS tag
/// with a mandatory `DEFAULT` arm.
#[derive(Debug, Clone, PartialEq)]
pub enum DictEntry {
    Phonemes(String),
    Tagged(HashMap<String, String>),
}

impl DictEntry {
    fn phoneme_strings(&self) -> Vec<&str> {
        match self {
            DictEntry::Phonemes(s) => vec![s.as_str()],
            DictEntry::Tagged(m) => m.values().map(String::as_str).collect(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct Lexicon {
    british: bool,
    entries: HashMap<String, DictEntry>,
    pub(crate) speller: Box<dyn NumberSpeller>,
}

impl Lexicon {
    /// Loads one of the bundled English dictionaries.
    pub fn english(british: bool, speller: Box<dyn NumberSpeller>) -> Result<Self, G2pError> {
        let json = if british {
            include_str!("../../data/en_gb.json")
        } else {
            include_str!("../../data/en_us.json")
        };
        Self::from_json(json, british, speller)
    }

    pub fn from_file(
        path: &std::path::Path,
        british: bool,
        speller: Box<dyn NumberSpeller>,
    ) -> Result<Self, G2pError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, british, speller)
    }

    /// Parses and validates a dictionary. Every phoneme string must stay
    /// inside the selected alphabet and tagged entries must carry a
    /// `DEFAULT` arm; violations are fatal.
    pub fn from_json(
        json: &str,
        british: bool,
        speller: Box<dyn NumberSpeller>,
    ) -> Result<Self, G2pError> {
        let root: Value = serde_json::from_str(json)?;
        let obj = root
            .as_object()
            .ok_or_else(|| G2pError::Config("lexicon root must be a JSON object".into()))?;

        let mut entries: HashMap<String, DictEntry> = HashMap::with_capacity(obj.len() * 2);
        for (word, value) in obj {
            let entry = match value {
                Value::String(s) => DictEntry::Phonemes(s.clone()),
                Value::Object(m) => {
                    let mut tagged = HashMap::with_capacity(m.len());
                    for (tag, v) in m {
                        let s = v.as_str().ok_or_else(|| {
                            G2pError::Config(format!("entry '{word}': tag '{tag}' is not a string"))
                        })?;
                        tagged.insert(tag.clone(), s.to_string());
                    }
                    if !tagged.contains_key("DEFAULT") {
                        return Err(G2pError::Config(format!(
                            "entry '{word}' has no DEFAULT arm"
                        )));
                    }
                    DictEntry::Tagged(tagged)
                }
                _ => {
                    return Err(G2pError::Config(format!(
                        "entry '{word}' must be a string or tag map"
                    )))
                }
            };
            for ps in entry.phoneme_strings() {
                if !in_vocab(ps, british) {
                    return Err(G2pError::Config(format!(
                        "entry '{word}' is outside the {} alphabet: {ps}",
                        if british { "GB" } else { "US" }
                    )));
                }
            }
            entries.insert(word.clone(), entry);
        }

        // Case expansion: lowercase headwords answer for their capitalized
        // spelling and vice versa, unless the variant is itself listed.
        let keys: Vec<String> = entries.keys().cloned().collect();
        for key in keys {
            let alias = if key == key.to_lowercase() {
                capitalize(&key)
            } else {
                key.to_lowercase()
            };
            if alias != key && !entries.contains_key(&alias) {
                let entry = entries[&key].clone();
                entries.insert(alias, entry);
            }
        }

        log::debug!(
            "loaded {} lexicon with {} entries",
            if british { "en-gb" } else { "en-us" },
            entries.len()
        );
        Ok(Lexicon {
            british,
            entries,
            speller,
        })
    }

    pub fn british(&self) -> bool {
        self.british
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Unconditional phonemes for a headword, taking the `DEFAULT` arm of
    /// tagged entries.
    fn plain(&self, word: &str) -> Option<&str> {
        match self.entries.get(word)? {
            DictEntry::Phonemes(s) => Some(s),
            DictEntry::Tagged(m) => m.get("DEFAULT").map(String::as_str),
        }
    }

    /// Whether lookup has any chance of succeeding without stemming.
    pub fn is_known(&self, word: &str) -> bool {
        if self.entries.contains_key(word) || SYMBOLS.contains_key(word) {
            return true;
        }
        if word.is_empty() || !word.chars().all(char::is_alphabetic) {
            return false;
        }
        if word.chars().count() == 1 {
            return true;
        }
        if word == word.to_uppercase() && self.entries.contains_key(&word.to_lowercase()) {
            return true;
        }
        // Initialisms resolve letter by letter.
        let tail: String = word.chars().skip(1).collect();
        tail == tail.to_uppercase()
    }

    /// Core dictionary fetch. All-caps spellings fall back to their
    /// lowercase headword; proper nouns with no stressed entry are spelled
    /// out letter by letter.
    pub fn lookup(
        &self,
        word: &str,
        tag: &str,
        stress: Option<f32>,
        ctx: Option<&TokenContext>,
    ) -> (Option<String>, Option<i32>) {
        let mut key = word.to_string();
        let mut all_caps_nnp = false;
        if key == key.to_uppercase() && !self.entries.contains_key(&key) {
            key = key.to_lowercase();
            all_caps_nnp = tag == "NNP";
        }
        let ps: Option<&str> = self.entries.get(&key).map(|entry| match entry {
            DictEntry::Phonemes(s) => s.as_str(),
            DictEntry::Tagged(m) => {
                let future_vowel = ctx.and_then(|c| c.future_vowel);
                let arm = if future_vowel.is_none() && m.contains_key("None") {
                    "None"
                } else if m.contains_key(tag) {
                    tag
                } else {
                    "DEFAULT"
                };
                m[arm].as_str()
            }
        });
        if ps.is_none_or(|ps| all_caps_nnp && !ps.contains(PRIMARY_STRESS)) {
            let (nnp, rating) = self.get_nnp(&key);
            if nnp.is_some() {
                return (nnp, rating);
            }
        }
        match ps {
            Some(ps) => (Some(apply_stress(ps, stress)), Some(RATING_LEXICON)),
            None => (None, None),
        }
    }

    /// Spells a word letter by letter, then promotes the final secondary
    /// stress to primary so the result reads as one name.
    pub fn get_nnp(&self, word: &str) -> (Option<String>, Option<i32>) {
        let mut joined = String::new();
        for c in word.chars().filter(|c| c.is_alphabetic()) {
            match self.plain(&c.to_uppercase().to_string()) {
                Some(ps) => joined.push_str(ps),
                None => return (None, None),
            }
        }
        if joined.is_empty() {
            return (None, None);
        }
        let ps = apply_stress(&joined, Some(0.0));
        let ps = match ps.rfind(SECONDARY_STRESS) {
            Some(i) => format!(
                "{}{}{}",
                &ps[..i],
                PRIMARY_STRESS,
                &ps[i + SECONDARY_STRESS.len_utf8()..]
            ),
            None => ps,
        };
        (Some(ps), Some(RATING_DERIVED))
    }

    /// Fixed idiosyncratic pronunciations, checked before every other path.
    /// Most are function words whose reading depends on lookahead context.
    fn get_special_case(
        &self,
        word: &str,
        tag: &str,
        stress: Option<f32>,
        ctx: Option<&TokenContext>,
    ) -> (Option<String>, Option<i32>) {
        let future_vowel = ctx.and_then(|c| c.future_vowel);
        if tag == "ADD" {
            if let Some(&replacement) = ADD_SYMBOLS.get(word) {
                return self.lookup(replacement, tag, Some(-0.5), ctx);
            }
        }
        if let Some(&replacement) = SYMBOLS.get(word) {
            return self.lookup(replacement, tag, None, ctx);
        }
        let undotted = word.replace('.', "");
        if word.contains('.')
            && !undotted.is_empty()
            && undotted.chars().all(char::is_alphabetic)
            && word
                .split('.')
                .map(|seg| seg.chars().count())
                .max()
                .unwrap_or(0)
                < 3
        {
            // Dotted abbreviations read as letters: "U.S.", "Dr.".
            return self.get_nnp(word);
        }
        if word == "a" || (word == "A" && tag == "DT") {
            return (
                Some(if tag == "DT" { "ɐ".into() } else { "ˈA".into() }),
                Some(RATING_LEXICON),
            );
        }
        if matches!(word, "am" | "Am" | "AM") {
            if tag.starts_with("NN") {
                return self.get_nnp(word);
            }
            if future_vowel.is_none() || word != "am" || stress.is_some_and(|s| s > 0.0) {
                return (self.plain("am").map(str::to_string), Some(RATING_LEXICON));
            }
            return (Some("ɐm".into()), Some(RATING_LEXICON));
        }
        if matches!(word, "an" | "An" | "AN") {
            if word == "AN" && tag.starts_with("NN") {
                return self.get_nnp(word);
            }
            return (Some("ɐn".into()), Some(RATING_LEXICON));
        }
        if word == "I" && tag == "PRP" {
            return (Some(format!("{SECONDARY_STRESS}I")), Some(RATING_LEXICON));
        }
        if matches!(word, "by" | "By" | "BY") && matches!(tag, "RB" | "ADV") {
            return (Some("bˈI".into()), Some(RATING_LEXICON));
        }
        if matches!(word, "to" | "To") || (word == "TO" && matches!(tag, "TO" | "IN")) {
            let ps = match future_vowel {
                None => self.plain("to").map(str::to_string),
                Some(false) => Some("tə".into()),
                Some(true) => Some("tʊ".into()),
            };
            return (ps, Some(RATING_LEXICON));
        }
        if matches!(word, "in" | "In") || (word == "IN" && tag == "IN") {
            let mark = if future_vowel.is_none() || tag != "IN" {
                PRIMARY_STRESS.to_string()
            } else {
                String::new()
            };
            return (Some(format!("{mark}ɪn")), Some(RATING_LEXICON));
        }
        if matches!(word, "the" | "The") || (word == "THE" && tag == "DT") {
            let ps = if future_vowel == Some(true) { "ði" } else { "ðə" };
            return (Some(ps.into()), Some(RATING_LEXICON));
        }
        if tag == "IN" && VS_RE.is_match(word) {
            return self.lookup("versus", tag, None, ctx);
        }
        if matches!(word, "used" | "Used" | "USED") {
            let arm = if matches!(tag, "VBD" | "JJ") && ctx.is_some_and(|c| c.future_to) {
                "VBD"
            } else {
                "DEFAULT"
            };
            if let Some(DictEntry::Tagged(m)) = self.entries.get("used") {
                if let Some(ps) = m.get(arm) {
                    return (Some(ps.clone()), Some(RATING_LEXICON));
                }
            }
            return (None, None);
        }
        (None, None)
    }

    /// Suffix phonetics for plural/possessive -s.
    pub(crate) fn append_s(&self, ps: &str) -> Option<String> {
        let last = ps.chars().last()?;
        Some(if "ptkfθ".contains(last) {
            format!("{ps}s")
        } else if "szʃʒʧʤ".contains(last) {
            format!("{ps}{}z", if self.british { 'ɪ' } else { 'ᵻ' })
        } else {
            format!("{ps}z")
        })
    }

    /// Suffix phonetics for past-tense -ed, with the American flap after a
    /// qualifying vowel.
    pub(crate) fn append_ed(&self, ps: &str) -> Option<String> {
        let chars: Vec<char> = ps.chars().collect();
        let last = *chars.last()?;
        Some(if "pkfθʃsʧ".contains(last) {
            format!("{ps}t")
        } else if last == 'd' {
            format!("{ps}{}d", if self.british { 'ɪ' } else { 'ᵻ' })
        } else if last != 't' {
            format!("{ps}d")
        } else if self.british || chars.len() < 2 {
            format!("{ps}ɪd")
        } else if is_us_tau(chars[chars.len() - 2]) {
            let stem: String = chars[..chars.len() - 1].iter().collect();
            format!("{stem}ɾᵻd")
        } else {
            format!("{ps}ᵻd")
        })
    }

    /// Suffix phonetics for progressive -ing. GB refuses stems ending in a
    /// schwa or long vowel so stemming fails and lookup moves on.
    pub(crate) fn append_ing(&self, ps: &str) -> Option<String> {
        let chars: Vec<char> = ps.chars().collect();
        let last = *chars.last()?;
        if self.british {
            if last == 'ə' || last == 'ː' {
                return None;
            }
        } else if last == 't' && chars.len() >= 2 && is_us_tau(chars[chars.len() - 2]) {
            let stem: String = chars[..chars.len() - 1].iter().collect();
            return Some(format!("{stem}ɾɪŋ"));
        }
        Some(format!("{ps}ɪŋ"))
    }

    fn stem_s(
        &self,
        word: &str,
        tag: &str,
        stress: Option<f32>,
        ctx: Option<&TokenContext>,
    ) -> (Option<String>, Option<i32>) {
        if !word.is_ascii() || word.len() < 3 || !word.ends_with('s') {
            return (None, None);
        }
        let n = word.len();
        let stem = if !word.ends_with("ss") && self.is_known(&word[..n - 1]) {
            word[..n - 1].to_string()
        } else if (word.ends_with("'s")
            || (n > 4 && word.ends_with("es") && !word.ends_with("ies")))
            && self.is_known(&word[..n - 2])
        {
            word[..n - 2].to_string()
        } else if n > 4 && word.ends_with("ies") && self.is_known(&format!("{}y", &word[..n - 3])) {
            format!("{}y", &word[..n - 3])
        } else {
            return (None, None);
        };
        let (ps, rating) = self.lookup(&stem, tag, stress, ctx);
        match ps.and_then(|ps| self.append_s(&ps)) {
            Some(ps) => (Some(ps), rating),
            None => (None, None),
        }
    }

    fn stem_ed(
        &self,
        word: &str,
        tag: &str,
        stress: Option<f32>,
        ctx: Option<&TokenContext>,
    ) -> (Option<String>, Option<i32>) {
        if !word.is_ascii() || word.len() < 4 || !word.ends_with('d') {
            return (None, None);
        }
        let n = word.len();
        let stem = if !word.ends_with("dd") && self.is_known(&word[..n - 1]) {
            &word[..n - 1]
        } else if n > 4 && word.ends_with("ed") && !word.ends_with("eed") && self.is_known(&word[..n - 2])
        {
            &word[..n - 2]
        } else {
            return (None, None);
        };
        let (ps, rating) = self.lookup(stem, tag, stress, ctx);
        match ps.and_then(|ps| self.append_ed(&ps)) {
            Some(ps) => (Some(ps), rating),
            None => (None, None),
        }
    }

    fn stem_ing(
        &self,
        word: &str,
        tag: &str,
        stress: Option<f32>,
        ctx: Option<&TokenContext>,
    ) -> (Option<String>, Option<i32>) {
        if !word.is_ascii() || word.len() < 5 || !word.ends_with("ing") {
            return (None, None);
        }
        let n = word.len();
        let bytes = word.as_bytes();
        let doubled = n > 5
            && bytes[n - 4] == bytes[n - 5]
            && b"bcdgklmnprstvxz".contains(&bytes[n - 4]);
        let stem = if n > 5 && self.is_known(&word[..n - 3]) {
            word[..n - 3].to_string()
        } else if self.is_known(&format!("{}e", &word[..n - 3])) {
            format!("{}e", &word[..n - 3])
        } else if n > 5 && (doubled || word.ends_with("cking")) && self.is_known(&word[..n - 4]) {
            word[..n - 4].to_string()
        } else {
            return (None, None);
        };
        let (ps, rating) = self.lookup(&stem, tag, stress, ctx);
        match ps.and_then(|ps| self.append_ing(&ps)) {
            Some(ps) => (Some(ps), rating),
            None => (None, None),
        }
    }

    /// Word-level orchestration: special cases, a conservative lowercasing
    /// of ambiguous-cased words, direct lookup, possessive variants, then
    /// the three stemmers in order.
    pub fn get_word(
        &self,
        word: &str,
        tag: &str,
        stress: Option<f32>,
        ctx: Option<&TokenContext>,
    ) -> (Option<String>, Option<i32>) {
        let (ps, rating) = self.get_special_case(word, tag, stress, ctx);
        if ps.is_some() {
            return (ps, rating);
        }

        let lower = word.to_lowercase();
        let tail: String = word.chars().skip(1).collect();
        let mut word = word.to_string();
        if word.chars().count() > 1
            && !word.is_empty()
            && word
                .chars()
                .all(|c| c.is_alphabetic() || crate::g2p::vocab::is_apostrophe(c))
            && word != lower
            && (tag != "NNP" || word.chars().count() > 7)
            && !self.entries.contains_key(&word)
            && (word == word.to_uppercase() || tail == tail.to_lowercase())
            && (self.entries.contains_key(&lower)
                || self.stem_s(&lower, tag, None, ctx).0.is_some()
                || self.stem_ed(&lower, tag, None, ctx).0.is_some()
                || self.stem_ing(&lower, tag, None, ctx).0.is_some())
        {
            word = lower;
        }
        // A retry that lowercases unconditionally when everything below
        // misses was left switched off; fallback handles those words.

        if self.is_known(&word) {
            return self.lookup(&word, tag, stress, ctx);
        }
        if word.ends_with("s'") {
            let possessive = format!("{}'s", &word[..word.len() - 2]);
            if self.is_known(&possessive) {
                return self.lookup(&possessive, tag, stress, ctx);
            }
        }
        if word.ends_with('\'') {
            let bare = &word[..word.len() - 1];
            if self.is_known(bare) {
                return self.lookup(bare, tag, stress, ctx);
            }
        }
        let (ps, rating) = self.stem_s(&word, tag, stress, ctx);
        if ps.is_some() {
            return (ps, rating);
        }
        let (ps, rating) = self.stem_ed(&word, tag, stress, ctx);
        if ps.is_some() {
            return (ps, rating);
        }
        self.stem_ing(&word, tag, stress, ctx)
    }

    /// Full per-token resolution: word path first, numeral path second.
    /// The token's own stress override is applied on top of either result.
    pub fn resolve(&self, token: &Token, ctx: &TokenContext) -> (Option<String>, Option<i32>) {
        let raw = token.alias.as_deref().unwrap_or(&token.text);
        let word: String = raw
            .chars()
            .map(|c| if matches!(c, '‘' | '’') { '\'' } else { c })
            .collect();
        let stress = if word == word.to_lowercase() {
            None
        } else if word == word.to_uppercase() {
            Some(CAP_STRESSES.1)
        } else {
            Some(CAP_STRESSES.0)
        };
        let (ps, rating) = self.get_word(&word, &token.tag, stress, Some(ctx));
        if let Some(ps) = ps {
            return (Some(apply_stress(&ps, token.stress)), rating);
        }
        if is_number(&word, token.is_head) {
            let (ps, rating) = self.get_number(
                &word,
                token.currency.as_deref(),
                token.is_head,
                &token.num_flags,
            );
            return (ps.map(|ps| apply_stress(&ps, token.stress)), rating);
        }
        (None, None)
    }
}
