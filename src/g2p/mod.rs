//! English grapheme-to-phoneme pipeline: preprocessing, tagging, token
//! folding, subtoken splitting, retokenization, dictionary resolution with
//! lookahead context, stress rebalancing, and assembly.

pub mod fallback;
pub mod lexicon;
pub mod number;
pub mod preprocess;
pub mod retokenize;
pub mod stress;
pub mod subtoken;
pub mod token;
pub mod vocab;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

pub use fallback::{FallbackModel, NullModel};
pub use lexicon::{
    DictEntry, Lexicon, RATING_DERIVED, RATING_GUESS, RATING_LEXICON, RATING_MODEL,
    RATING_OVERRIDE,
};
pub use preprocess::InlineFeature;
pub use retokenize::ResolutionGroup;
pub use token::{merge_tokens, Token, TokenContext};
pub use vocab::UNKNOWN_PHONEMES;

use fallback::token_fallback;
use lexicon::RATING_OVERRIDE as OVERRIDE;
use preprocess::preprocess;
use retokenize::retokenize;
use stress::{apply_stress, stress_weight};
use vocab::{
    is_consonant, is_junk, is_non_quote_punct, is_vowel, PRIMARY_STRESS,
};

use crate::speller::EnglishSpeller;
use crate::tagger::{RuleTagger, Tagger};

#[derive(Debug, Error)]
pub enum G2pError {
    /// Malformed dictionary data; fatal at load time.
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The cancel token fired; partial work was discarded.
    #[error("phonemization cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for G2pError {
    fn from(e: serde_json::Error) -> Self {
        G2pError::Config(e.to_string())
    }
}

/// Cooperative cancellation flag, checked between token resolutions.
/// Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), G2pError> {
        if self.is_cancelled() {
            Err(G2pError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Result of phonemizing one text: the assembled phoneme string and the
/// per-token metadata behind it.
#[derive(Debug, Clone)]
pub struct G2pOutput {
    pub phonemes: String,
    pub tokens: Vec<Token>,
}

/// Lookahead context for the token preceding `token` in reading order,
/// derived from that token's resolved phonemes.
fn token_context(ctx: TokenContext, ps: Option<&str>, token: &Token) -> TokenContext {
    let mut future_vowel = ctx.future_vowel;
    if let Some(ps) = ps {
        for c in ps.chars() {
            if is_vowel(c) {
                future_vowel = Some(true);
                break;
            }
            if is_consonant(c) {
                future_vowel = Some(false);
                break;
            }
            if is_non_quote_punct(c) {
                future_vowel = None;
                break;
            }
        }
    }
    let future_to = token.text == "to"
        || token.text == "To"
        || (token.text == "TO" && matches!(token.tag.as_str(), "TO" | "IN"));
    TokenContext {
        future_vowel,
        future_to,
    }
}

/// Post-resolution pass over a span: settles leftover punctuation and junk
/// pieces, decides prespacing for spelled-out spans, and spreads stress so
/// a merged phrase does not stack primary marks.
pub(crate) fn resolve_tokens(tokens: &mut [Token]) {
    let n = tokens.len();
    if n == 0 {
        return;
    }
    let mut text = String::new();
    for (i, t) in tokens.iter().enumerate() {
        text.push_str(&t.text);
        if i + 1 < n {
            text.push_str(&t.whitespace);
        }
    }
    let mut classes = [false; 3];
    for c in text.chars() {
        if c.is_alphabetic() {
            classes[0] = true;
        } else if c.is_ascii_digit() {
            classes[1] = true;
        } else {
            classes[2] = true;
        }
    }
    let prespace = text.contains(' ')
        || text.contains('/')
        || classes.iter().filter(|&&b| b).count() > 1;

    for i in 0..n {
        if tokens[i].phonemes.is_none() {
            let single_punct = i == n - 1
                && tokens[i].text.chars().count() == 1
                && tokens[i].text.chars().next().is_some_and(is_non_quote_punct);
            if single_punct {
                tokens[i].phonemes = Some(tokens[i].text.clone());
                tokens[i].rating = Some(lexicon::RATING_DERIVED);
            } else if tokens[i].text.chars().all(is_junk) {
                tokens[i].phonemes = Some(String::new());
                tokens[i].rating = Some(lexicon::RATING_DERIVED);
            }
        } else if i > 0 {
            tokens[i].prespace = prespace;
        }
    }
    if prespace {
        return;
    }

    let with_ps: Vec<usize> = (0..n)
        .filter(|&i| tokens[i].phonemes.as_deref().is_some_and(|p| !p.is_empty()))
        .collect();
    let stressed: Vec<usize> = with_ps
        .iter()
        .copied()
        .filter(|&i| tokens[i].phonemes.as_deref().unwrap().contains(PRIMARY_STRESS))
        .collect();
    if stressed.len() == 2 && tokens[stressed[0]].text.chars().count() == 1 {
        // Initialism prefix: keep its stress, soften the second.
        let i = stressed[1];
        let demoted = apply_stress(tokens[i].phonemes.as_deref().unwrap(), Some(-0.5));
        tokens[i].phonemes = Some(demoted);
        return;
    }
    if stressed.len() < 2 || 2 * stressed.len() <= with_ps.len() {
        return;
    }
    let mut ranked = with_ps;
    ranked.sort_by_key(|&i| {
        let ps = tokens[i].phonemes.as_deref().unwrap();
        (ps.contains(PRIMARY_STRESS), stress_weight(ps), i)
    });
    for &i in &ranked[..ranked.len() / 2] {
        let demoted = apply_stress(tokens[i].phonemes.as_deref().unwrap(), Some(-0.5));
        tokens[i].phonemes = Some(demoted);
    }
}

/// The pipeline. Immutable after construction; one instance can phonemize
/// texts from multiple threads concurrently.
pub struct G2p {
    lexicon: Lexicon,
    tagger: Box<dyn Tagger>,
    model: Box<dyn FallbackModel>,
    unk: String,
}

impl G2p {
    pub fn new(lexicon: Lexicon, tagger: Box<dyn Tagger>, model: Box<dyn FallbackModel>) -> Self {
        G2p {
            lexicon,
            tagger,
            model,
            unk: UNKNOWN_PHONEMES.to_string(),
        }
    }

    /// Bundled English setup: built-in dictionary, rule tagger, no model.
    pub fn english(british: bool) -> Result<Self, G2pError> {
        let lexicon = Lexicon::english(british, Box::new(EnglishSpeller))?;
        Ok(G2p::new(lexicon, Box::new(RuleTagger), Box::new(NullModel)))
    }

    /// Replaces the marker emitted for unresolvable tokens.
    pub fn with_unk(mut self, unk: impl Into<String>) -> Self {
        self.unk = unk.into();
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn phonemize(&self, text: &str) -> Result<G2pOutput, G2pError> {
        self.phonemize_with(text, &CancelToken::default())
    }

    pub fn phonemize_with(
        &self,
        text: &str,
        cancel: &CancelToken,
    ) -> Result<G2pOutput, G2pError> {
        let (normalized, words, features) = preprocess(text);
        let tokens = self.tokenize(&normalized, &words, &features);
        let mut groups = retokenize(&self.lexicon, tokens, cancel)?;
        self.resolve_groups(&mut groups, cancel)?;

        let mut tokens: Vec<Token> = Vec::new();
        for group in groups {
            match group {
                ResolutionGroup::Single(t) => tokens.push(t),
                ResolutionGroup::Span(v) => tokens.extend(v),
            }
        }
        let phonemes = assemble(&mut tokens, &self.unk);
        log::debug!("phonemized {} tokens", tokens.len());
        Ok(G2pOutput { phonemes, tokens })
    }

    /// Runs the tagger, maps inline features onto its output, then folds
    /// continuation tokens into their predecessor.
    fn tokenize(
        &self,
        text: &str,
        words: &[String],
        features: &HashMap<usize, InlineFeature>,
    ) -> Vec<Token> {
        let mut tokens: Vec<Token> = self
            .tagger
            .segment(text)
            .into_iter()
            .map(|(word, tag, ws)| Token::new(word, tag, ws))
            .collect();

        if !features.is_empty() {
            // Realign tagger tokens to the preprocessor's word list by
            // accumulated non-whitespace length, so features land on the
            // right spans even when the tagger splits differently.
            let mut result: Vec<Token> = Vec::new();
            let mut acc: Vec<Token> = Vec::new();
            let mut acc_len = 0usize;
            let mut word_idx = 0usize;
            for tk in tokens {
                acc_len += tk.text.chars().filter(|c| !c.is_whitespace()).count();
                acc.push(tk);
                let target = words
                    .get(word_idx)
                    .map(|w| w.chars().filter(|c| !c.is_whitespace()).count())
                    .unwrap_or(usize::MAX);
                if acc_len < target {
                    continue;
                }
                match features.get(&word_idx) {
                    Some(InlineFeature::Stress(s)) => {
                        for t in &mut acc {
                            t.stress = Some(*s);
                        }
                        result.append(&mut acc);
                    }
                    Some(InlineFeature::Phonemes(ps)) => {
                        let mut merged = merge_tokens(&acc, None);
                        merged.phonemes = Some(ps.clone());
                        merged.rating = Some(OVERRIDE);
                        acc.clear();
                        result.push(merged);
                    }
                    Some(InlineFeature::Alias(alias)) => {
                        let mut merged = merge_tokens(&acc, None);
                        merged.alias = Some(alias.clone());
                        acc.clear();
                        result.push(merged);
                    }
                    None => result.append(&mut acc),
                }
                acc_len = 0;
                word_idx += 1;
            }
            result.append(&mut acc);
            tokens = result;
        }

        // Fold continuation tokens (no whitespace before them) into their
        // predecessor; the splitter re-divides on finer boundaries.
        let mut folded: Vec<Token> = Vec::new();
        for (i, mut tk) in tokens.into_iter().enumerate() {
            let head = i == 0
                || folded
                    .last()
                    .is_none_or(|prev| !prev.whitespace.is_empty());
            tk.is_head = head;
            let foldable = !head
                && tk.phonemes.is_none()
                && tk.alias.is_none()
                && folded
                    .last()
                    .is_some_and(|prev| prev.phonemes.is_none() && prev.alias.is_none());
            if foldable {
                let prev = folded.pop().unwrap();
                folded.push(merge_tokens(&[prev, tk], None));
            } else {
                folded.push(tk);
            }
        }
        folded
    }

    /// Right-to-left resolution threading lookahead context backward.
    fn resolve_groups(
        &self,
        groups: &mut [ResolutionGroup],
        cancel: &CancelToken,
    ) -> Result<(), G2pError> {
        let mut ctx = TokenContext::default();
        for group in groups.iter_mut().rev() {
            cancel.check()?;
            match group {
                ResolutionGroup::Single(tk) => {
                    if tk.phonemes.is_none() {
                        let (ps, rating) = self.lexicon.resolve(tk, &ctx);
                        if ps.is_some() {
                            tk.phonemes = ps;
                            tk.rating = rating;
                        } else {
                            let (ps, rating) =
                                token_fallback(&self.lexicon, self.model.as_ref(), tk);
                            tk.phonemes = ps;
                            tk.rating = rating;
                        }
                    }
                    ctx = token_context(ctx, tk.phonemes.as_deref(), tk);
                }
                ResolutionGroup::Span(tks) => {
                    ctx = self.resolve_span(tks, ctx, cancel)?;
                    resolve_tokens(tks);
                }
            }
        }
        Ok(())
    }

    /// Longest-match search over one span. The window strictly shrinks on
    /// every failure, so the search always terminates.
    fn resolve_span(
        &self,
        tks: &mut [Token],
        mut ctx: TokenContext,
        cancel: &CancelToken,
    ) -> Result<TokenContext, G2pError> {
        let mut left = 0usize;
        let mut right = tks.len();
        let mut needs_fallback = false;
        while left < right {
            cancel.check()?;
            let window = &tks[left..right];
            let (ps, rating) = if window.len() == 1 {
                self.lexicon.resolve(&window[0], &ctx)
            } else if window
                .iter()
                .any(|t| t.alias.is_some() || t.phonemes.is_some())
            {
                (None, None)
            } else {
                let merged = merge_tokens(window, None);
                self.lexicon.resolve(&merged, &ctx)
            };
            if let Some(ps) = ps {
                tks[left].phonemes = Some(ps);
                tks[left].rating = rating;
                for t in &mut tks[left + 1..right] {
                    t.phonemes = Some(String::new());
                    t.rating = rating;
                }
                ctx = token_context(ctx, tks[left].phonemes.as_deref(), &tks[left]);
                right = left;
                left = 0;
            } else if left + 1 < right {
                left += 1;
            } else {
                right -= 1;
                left = 0;
                let trailing = &mut tks[right];
                if trailing.phonemes.is_none() {
                    if !trailing.text.is_empty() && trailing.text.chars().all(is_junk) {
                        trailing.phonemes = Some(String::new());
                        trailing.rating = Some(lexicon::RATING_DERIVED);
                    } else {
                        needs_fallback = true;
                        break;
                    }
                }
            }
        }
        if needs_fallback {
            ctx = TokenContext::default();
            for tk in tks.iter_mut() {
                if tk.phonemes.is_none() {
                    let (ps, rating) = token_fallback(&self.lexicon, self.model.as_ref(), tk);
                    tk.phonemes = ps;
                    tk.rating = rating;
                }
            }
        }
        Ok(ctx)
    }
}

/// Concatenates resolved phonemes and whitespace, emitting the unknown
/// marker for anything still unresolved. Two symbols are normalized for
/// the synthesizer on the way out: the flap becomes `T` and the glottal
/// stop becomes `t`.
fn assemble(tokens: &mut [Token], unk: &str) -> String {
    let mut out = String::new();
    for tk in tokens.iter_mut() {
        if let Some(ps) = tk.phonemes.as_mut() {
            if ps.contains('ɾ') || ps.contains('ʔ') {
                *ps = ps.replace('ɾ', "T").replace('ʔ', "t");
            }
        }
        let ps = tk.phonemes.as_deref().unwrap_or(unk);
        if tk.prespace && !out.is_empty() && !out.ends_with(char::is_whitespace) && !ps.is_empty()
        {
            out.push(' ');
        }
        out.push_str(ps);
        out.push_str(&tk.whitespace);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tk(text: &str, ps: Option<&str>, ws: &str) -> Token {
        let mut t = Token::new(text, "NN", ws);
        t.phonemes = ps.map(str::to_string);
        t
    }

    #[test]
    fn context_tracks_first_sound() {
        let ctx = TokenContext::default();
        let t = Token::new("apple", "NN", " ");
        assert_eq!(
            token_context(ctx, Some("ˈæpəl"), &t).future_vowel,
            Some(true)
        );
        assert_eq!(
            token_context(ctx, Some("kˈæt"), &t).future_vowel,
            Some(false)
        );
        assert_eq!(token_context(ctx, Some("."), &t).future_vowel, None);
    }

    #[test]
    fn context_sees_to() {
        let ctx = TokenContext::default();
        let t = Token::new("to", "TO", " ");
        assert!(token_context(ctx, Some("tˈu"), &t).future_to);
        let t = Token::new("town", "NN", " ");
        assert!(!token_context(ctx, Some("tˈWn"), &t).future_to);
    }

    #[test]
    fn rebalance_demotes_weaker_half() {
        let mut tokens = vec![
            tk("green", Some("ɡɹˈin"), ""),
            tk("house", Some("hˈWs"), ""),
        ];
        resolve_tokens(&mut tokens);
        let first = tokens[0].phonemes.as_deref().unwrap();
        let second = tokens[1].phonemes.as_deref().unwrap();
        // Exactly one of the two keeps its primary stress.
        let primaries = [first, second]
            .iter()
            .filter(|p| p.contains(PRIMARY_STRESS))
            .count();
        assert_eq!(primaries, 1);
    }

    #[test]
    fn junk_pieces_settle_silent() {
        let mut tokens = vec![tk("cat", Some("kˈæt"), ""), tk("-", None, "")];
        resolve_tokens(&mut tokens);
        assert_eq!(tokens[1].phonemes.as_deref(), Some(""));
    }

    #[test]
    fn assemble_inserts_unknown_marker() {
        let mut tokens = vec![tk("x", Some("ˈɛks"), " "), tk("zzz", None, "")];
        let out = assemble(&mut tokens, UNKNOWN_PHONEMES);
        assert_eq!(out, "ˈɛks ❓");
    }

    #[test]
    fn assemble_rewrites_flap_and_glottal_stop() {
        let mut tokens = vec![tk("city", Some("sˈɪɾi"), "")];
        let out = assemble(&mut tokens, UNKNOWN_PHONEMES);
        assert_eq!(out, "sˈɪTi");
        assert_eq!(tokens[0].phonemes.as_deref(), Some("sˈɪTi"));
    }

    #[test]
    fn cancel_token_round_trip() {
        let cancel = CancelToken::new();
        assert!(cancel.check().is_ok());
        cancel.clone().cancel();
        assert!(matches!(cancel.check(), Err(G2pError::Cancelled)));
    }
}
