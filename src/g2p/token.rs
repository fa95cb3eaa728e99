/// The mutable unit flowing through the pipeline. Created by the tagger
/// adapter, mutated in place through folding, splitting, retokenization and
/// resolution, then read out by the assembler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    pub text: String,
    /// Penn-style part-of-speech tag.
    pub tag: String,
    /// Trailing whitespace, preserved byte for byte.
    pub whitespace: String,
    /// `None` until resolved. An empty string is a valid silent resolution.
    pub phonemes: Option<String>,
    pub start_ts: Option<f32>,
    pub end_ts: Option<f32>,
    /// Whether this token starts a new orthographic word.
    pub is_head: bool,
    /// Text substitute used only for lookup.
    pub alias: Option<String>,
    /// Stress override carried into lookup.
    pub stress: Option<f32>,
    /// Currency symbol attached to a numeral.
    pub currency: Option<String>,
    /// Flag characters controlling number-reading variants.
    pub num_flags: String,
    /// Whether assembly should insert a space before this token's phonemes.
    pub prespace: bool,
    /// Confidence for the resolved pronunciation; lower is better.
    pub rating: Option<i32>,
}

impl Token {
    pub fn new(text: impl Into<String>, tag: impl Into<String>, whitespace: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            tag: tag.into(),
            whitespace: whitespace.into(),
            is_head: true,
            ..Default::default()
        }
    }
}

/// Lookahead state threaded backward through the resolver: what is known
/// about the token *after* the current one in reading order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TokenContext {
    pub future_vowel: Option<bool>,
    pub future_to: bool,
}

/// Merges a run of tokens into a single surface token.
///
/// When `unk` is given, unresolved members contribute the marker and the
/// merged token is considered resolved; otherwise phonemes stay unset.
pub fn merge_tokens(tokens: &[Token], unk: Option<&str>) -> Token {
    debug_assert!(!tokens.is_empty());
    let last = tokens.len() - 1;

    let mut stresses: Vec<f32> = tokens.iter().filter_map(|t| t.stress).collect();
    stresses.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    stresses.dedup_by(|a, b| a == b);

    let currency = tokens
        .iter()
        .filter_map(|t| t.currency.as_deref())
        .max()
        .map(str::to_string);

    let rating = if tokens.iter().any(|t| t.rating.is_none()) {
        None
    } else {
        tokens.iter().filter_map(|t| t.rating).max()
    };

    let phonemes = unk.map(|unk| {
        let mut ps = String::new();
        for t in tokens {
            if t.prespace
                && !ps.is_empty()
                && !ps.ends_with(char::is_whitespace)
                && t.phonemes.as_deref().map_or(true, |p| !p.is_empty())
            {
                ps.push(' ');
            }
            ps.push_str(t.phonemes.as_deref().unwrap_or(unk));
        }
        ps
    });

    let mut text = String::new();
    for t in &tokens[..last] {
        text.push_str(&t.text);
        text.push_str(&t.whitespace);
    }
    text.push_str(&tokens[last].text);

    // The most capitalized member decides the tag.
    let tag = tokens
        .iter()
        .max_by_key(|t| {
            t.text
                .chars()
                .map(|c| if c.is_uppercase() { 2usize } else { 1 })
                .sum::<usize>()
        })
        .map(|t| t.tag.clone())
        .unwrap_or_default();

    let mut flags: Vec<char> = tokens
        .iter()
        .flat_map(|t| t.num_flags.chars())
        .collect();
    flags.sort_unstable();
    flags.dedup();

    Token {
        text,
        tag,
        whitespace: tokens[last].whitespace.clone(),
        phonemes,
        start_ts: tokens[0].start_ts,
        end_ts: tokens[last].end_ts,
        is_head: tokens[0].is_head,
        alias: None,
        stress: if stresses.len() == 1 { Some(stresses[0]) } else { None },
        currency,
        num_flags: flags.into_iter().collect(),
        prespace: tokens[0].prespace,
        rating,
    }
}
