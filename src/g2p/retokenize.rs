//! Regroups tagger output into resolvable spans. Tokens are split into
//! lexical pieces, trivially-resolvable pieces (punctuation, currency
//! symbols) are settled on the spot, and what remains is bundled into
//! groups for joint dictionary resolution.

use crate::g2p::lexicon::{Lexicon, RATING_LEXICON};
use crate::g2p::subtoken::subtokenize;
use crate::g2p::token::Token;
use crate::g2p::vocab::{is_punct, CURRENCIES};
use crate::g2p::{CancelToken, G2pError};

/// A unit of work for the resolver: either settled (or resolvable alone),
/// or a run of pieces that may merge into one dictionary word.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionGroup {
    Single(Token),
    Span(Vec<Token>),
}

fn is_numeral_text(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
}

/// Literal reading for a piece made of punctuation only, with bracket and
/// straight-quote shapes normalized to the synthesizer's inventory.
pub(crate) fn punct_phonemes(text: &str) -> Option<String> {
    if text.is_empty() || text.chars().any(char::is_alphanumeric) {
        return None;
    }
    let mapped: String = text
        .chars()
        .map(|c| match c {
            '(' | '[' | '{' => '«',
            ')' | ']' | '}' => '»',
            '"' => '”',
            c => c,
        })
        .collect();
    if mapped.chars().all(is_punct) {
        Some(mapped)
    } else {
        None
    }
}

pub(crate) fn retokenize(
    lexicon: &Lexicon,
    tokens: Vec<Token>,
    cancel: &CancelToken,
) -> Result<Vec<ResolutionGroup>, G2pError> {
    // Pass 1: split each unresolved token into its pieces. The last piece
    // keeps the trailing whitespace; later pieces are continuations.
    let mut pieces: Vec<Token> = Vec::new();
    for tk in tokens {
        cancel.check()?;
        if tk.alias.is_some() || tk.phonemes.is_some() {
            pieces.push(tk);
            continue;
        }
        let parts = subtokenize(&tk.text);
        if parts.is_empty() {
            pieces.push(tk);
            continue;
        }
        let last = parts.len() - 1;
        for (i, text) in parts.into_iter().enumerate() {
            pieces.push(Token {
                text,
                tag: tk.tag.clone(),
                whitespace: if i == last {
                    tk.whitespace.clone()
                } else {
                    String::new()
                },
                is_head: if i == 0 { tk.is_head } else { false },
                stress: tk.stress,
                num_flags: tk.num_flags.clone(),
                ..Default::default()
            });
        }
    }

    // Pass 2: settle currency symbols and punctuation, attach currency
    // spans to their numerals, and catch "2" standing in for "to".
    let mut open_currency: Option<usize> = None;
    for i in 0..pieces.len() {
        if pieces[i].phonemes.is_some() || pieces[i].alias.is_some() {
            open_currency = None;
            continue;
        }
        let text = pieces[i].text.clone();
        let single_char = text.chars().count() == 1;
        let first = text.chars().next();

        if single_char
            && first.is_some_and(|c| CURRENCIES.contains_key(&c))
            && matches!(pieces[i].tag.as_str(), "$" | "SYM" | "NUM" | "CD")
        {
            let unit = CURRENCIES[&first.unwrap()].0;
            let (ps, rating) = lexicon.lookup(unit, "", None, None);
            pieces[i].phonemes = ps;
            pieces[i].rating = rating;
            open_currency = Some(i);
            continue;
        }

        if is_numeral_text(&text) {
            if text == "2"
                && i > 0
                && i + 1 < pieces.len()
                && pieces[i - 1]
                    .text
                    .chars()
                    .last()
                    .is_some_and(char::is_alphabetic)
                && pieces[i + 1]
                    .text
                    .chars()
                    .next()
                    .is_some_and(char::is_alphabetic)
            {
                pieces[i].alias = Some("to".into());
                open_currency = None;
                continue;
            }
            if let Some(sym) = open_currency {
                let next_numeral = pieces
                    .get(i + 1)
                    .is_some_and(|p| is_numeral_text(&p.text));
                if !next_numeral {
                    pieces[i].currency = Some(pieces[sym].text.clone());
                    pieces[sym].phonemes = Some(String::new());
                    open_currency = None;
                }
            }
            continue;
        }

        open_currency = None;
        if let Some(ps) = punct_phonemes(&text) {
            pieces[i].phonemes = Some(ps);
            pieces[i].rating = Some(RATING_LEXICON);
        }
    }

    // Pass 3: group. A piece with trailing whitespace closes its group;
    // settled pieces stand alone.
    let mut groups: Vec<ResolutionGroup> = Vec::new();
    let mut pending: Vec<Token> = Vec::new();
    fn flush(pending: &mut Vec<Token>, groups: &mut Vec<ResolutionGroup>) {
        match pending.len() {
            0 => {}
            1 => groups.push(ResolutionGroup::Single(pending.pop().unwrap())),
            _ => groups.push(ResolutionGroup::Span(std::mem::take(pending))),
        }
    }
    for piece in pieces {
        if piece.phonemes.is_some() {
            flush(&mut pending, &mut groups);
            groups.push(ResolutionGroup::Single(piece));
        } else if piece.whitespace.is_empty() {
            pending.push(piece);
        } else {
            pending.push(piece);
            flush(&mut pending, &mut groups);
        }
    }
    flush(&mut pending, &mut groups);
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speller::EnglishSpeller;

    fn us() -> Lexicon {
        Lexicon::english(false, Box::new(EnglishSpeller)).unwrap()
    }

    fn tk(text: &str, tag: &str, ws: &str) -> Token {
        Token::new(text, tag, ws)
    }

    #[test]
    fn currency_attaches_to_numeral() {
        let lex = us();
        let groups = retokenize(
            &lex,
            vec![tk("$19.99", "CD", "")],
            &CancelToken::default(),
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        let ResolutionGroup::Single(sym) = &groups[0] else {
            panic!("expected settled symbol");
        };
        assert_eq!(sym.phonemes.as_deref(), Some(""));
        let ResolutionGroup::Single(num) = &groups[1] else {
            panic!("expected numeral");
        };
        assert_eq!(num.currency.as_deref(), Some("$"));
        assert!(num.phonemes.is_none());
    }

    #[test]
    fn punctuation_is_settled_inline() {
        let lex = us();
        let groups = retokenize(
            &lex,
            vec![tk("cat", "NN", ""), tk(".", ".", "")],
            &CancelToken::default(),
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        let ResolutionGroup::Single(dot) = &groups[1] else {
            panic!("expected settled dot");
        };
        assert_eq!(dot.phonemes.as_deref(), Some("."));
    }

    #[test]
    fn parens_are_normalized() {
        assert_eq!(punct_phonemes("("), Some("«".into()));
        assert_eq!(punct_phonemes(")"), Some("»".into()));
        assert_eq!(punct_phonemes("a"), None);
    }

    #[test]
    fn digit_two_between_letters_reads_as_to() {
        let lex = us();
        let groups = retokenize(&lex, vec![tk("b2b", "NN", "")], &CancelToken::default()).unwrap();
        let ResolutionGroup::Span(span) = &groups[0] else {
            panic!("expected span");
        };
        assert_eq!(span[1].alias.as_deref(), Some("to"));
    }

    #[test]
    fn whitespace_closes_groups() {
        let lex = us();
        let groups = retokenize(
            &lex,
            vec![tk("New", "NNP", " "), tk("York", "NNP", "")],
            &CancelToken::default(),
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        assert!(matches!(groups[0], ResolutionGroup::Single(_)));
    }

    #[test]
    fn hyphenated_word_forms_one_span() {
        let lex = us();
        let groups = retokenize(&lex, vec![tk("mother-in-law", "NN", "")], &CancelToken::default())
            .unwrap();
        assert_eq!(groups.len(), 1);
        let ResolutionGroup::Span(span) = &groups[0] else {
            panic!("expected span");
        };
        assert_eq!(span.len(), 5);
    }
}
