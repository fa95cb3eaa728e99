use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]+)\]\(([^\)]*)\)").unwrap();
}

/// An inline override decoded from a `[display](feature)` span.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineFeature {
    /// Stress directive applied to every token of the display text.
    Stress(f32),
    /// Literal phoneme string replacing the display text's pronunciation.
    Phonemes(String),
    /// Alternate spelling used only for lookup.
    Alias(String),
}

fn parse_feature(raw: &str) -> Option<InlineFeature> {
    if matches!(raw, "0.5" | "+0.5" | "-0.5") {
        let v: f32 = raw.parse().ok()?;
        return Some(InlineFeature::Stress(v));
    }
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok().map(InlineFeature::Stress);
    }
    if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
        return Some(InlineFeature::Phonemes(raw[1..raw.len() - 1].to_string()));
    }
    if raw.len() >= 2 && raw.starts_with('#') && raw.ends_with('#') {
        return Some(InlineFeature::Alias(raw[1..raw.len() - 1].to_string()));
    }
    // Unrecognized features are dropped, not errors.
    None
}

/// Strips `[display](feature)` spans from the input, returning the cleaned
/// text, the raw word list, and a map from word index to decoded feature.
/// Each annotated display text counts as exactly one word.
pub fn preprocess(text: &str) -> (String, Vec<String>, HashMap<usize, InlineFeature>) {
    let text = text.trim_start();
    let mut result = String::new();
    let mut words: Vec<String> = Vec::new();
    let mut features = HashMap::new();
    let mut last_end = 0;

    for caps in LINK_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let before = &text[last_end..m.start()];
        result.push_str(before);
        words.extend(before.split_whitespace().map(str::to_string));

        let display = caps.get(1).unwrap().as_str();
        if let Some(feature) = parse_feature(caps.get(2).unwrap().as_str()) {
            features.insert(words.len(), feature);
        }
        result.push_str(display);
        words.push(display.to_string());
        last_end = m.end();
    }

    let rest = &text[last_end..];
    result.push_str(rest);
    words.extend(rest.split_whitespace().map(str::to_string));
    (result, words, features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let (text, words, features) = preprocess("  hello world");
        assert_eq!(text, "hello world");
        assert_eq!(words, vec!["hello", "world"]);
        assert!(features.is_empty());
    }

    #[test]
    fn integer_stress_feature() {
        let (text, words, features) = preprocess("say [this](-1) now");
        assert_eq!(text, "say this now");
        assert_eq!(words, vec!["say", "this", "now"]);
        assert_eq!(features.get(&1), Some(&InlineFeature::Stress(-1.0)));
    }

    #[test]
    fn half_stress_feature() {
        let (_, _, features) = preprocess("[word](+0.5)");
        assert_eq!(features.get(&0), Some(&InlineFeature::Stress(0.5)));
    }

    #[test]
    fn phoneme_and_alias_features() {
        let (_, words, features) = preprocess("[Kokoro](/kˈOkəɹO/) [two](#2#)");
        assert_eq!(words, vec!["Kokoro", "two"]);
        assert_eq!(
            features.get(&0),
            Some(&InlineFeature::Phonemes("kˈOkəɹO".into()))
        );
        assert_eq!(features.get(&1), Some(&InlineFeature::Alias("2".into())));
    }

    #[test]
    fn unknown_feature_is_dropped() {
        let (text, _, features) = preprocess("[word](nonsense)");
        assert_eq!(text, "word");
        assert!(features.is_empty());
    }
}
