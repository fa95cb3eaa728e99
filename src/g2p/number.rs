//! Numeral reading: digit strings, grouped hundreds, years, currency pairs
//! and decimal points, all rendered to words and then phonemized through
//! the dictionary.

use crate::g2p::lexicon::{Lexicon, RATING_LEXICON};
use crate::g2p::vocab::CURRENCIES;
use crate::speller::SpellRules;

const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

/// Whether a token's text reads as a numeral once a known trailing suffix
/// (ordinal marker, possessive, tense) is set aside. A minus sign counts
/// only on a head token.
pub(crate) fn is_number(word: &str, is_head: bool) -> bool {
    if !word.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let mut body = word;
    for suffix in ["ing", "'ll", "'d", "ed", "'s", "st", "nd", "rd", "th", "s"] {
        if let Some(stripped) = body.strip_suffix(suffix) {
            body = stripped;
            break;
        }
    }
    body.chars().enumerate().all(|(i, c)| {
        c.is_ascii_digit() || matches!(c, ',' | '.') || (is_head && i == 0 && c == '-')
    })
}

/// One word of the spoken rendering, pending dictionary lookup.
struct Piece {
    word: String,
    stress: Option<f32>,
    plural: bool,
}

impl Piece {
    fn plain(word: impl Into<String>) -> Self {
        Piece {
            word: word.into(),
            stress: None,
            plural: false,
        }
    }
}

fn digit_word(c: char) -> &'static str {
    DIGIT_WORDS[(c as u8 - b'0') as usize]
}

/// (major, minor) values when the numeral is a well-formed 0-2 decimal
/// money amount.
fn parse_money(num: &str) -> Option<(u64, u64)> {
    let mut parts = num.split('.');
    let major: u64 = parts.next()?.replace(',', "").parse().ok()?;
    let minor = match parts.next() {
        Some(frac) => {
            if !(1..=2).contains(&frac.len()) {
                return None;
            }
            frac.parse().ok()?
        }
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor))
}

impl Lexicon {
    fn extend_spelled(&self, pieces: &mut Vec<Piece>, spelled: &str, num_flags: &str) {
        for word in spelled.split_whitespace() {
            if word == "and" && !num_flags.contains('&') {
                continue;
            }
            pieces.push(Piece::plain(word));
        }
    }

    /// Renders a numeral token to phonemes. Returns `(None, None)` when no
    /// spoken form can be produced; the caller's fallback chain decides
    /// what to do with it.
    pub(crate) fn get_number(
        &self,
        word: &str,
        currency: Option<&str>,
        is_head: bool,
        num_flags: &str,
    ) -> (Option<String>, Option<i32>) {
        let suffix_len = word
            .chars()
            .rev()
            .take_while(|&c| c.is_ascii_lowercase() || c == '\'')
            .count();
        let (num, suffix) = word.split_at(word.len() - suffix_len);

        let mut pieces: Vec<Piece> = Vec::new();
        let mut num = num;
        if let Some(rest) = num.strip_prefix('-') {
            pieces.push(Piece::plain("minus"));
            num = rest;
        }
        let digits = num.replace(',', "");
        let is_ordinal = matches!(suffix, "st" | "nd" | "rd" | "th");
        let money = currency
            .and_then(|s| s.chars().next())
            .and_then(|c| CURRENCIES.get(&c))
            .and_then(|units| parse_money(num).map(|values| (*units, values)));

        if !is_head && !num.contains('.') {
            // Continuation fragments: "room101" reads its digits.
            if digits.starts_with('0') || digits.len() > 3 {
                for c in digits.chars().filter(char::is_ascii_digit) {
                    pieces.push(Piece::plain(digit_word(c)));
                }
            } else if digits.len() == 3 && !digits.ends_with("00") {
                let mut it = digits.chars();
                let (hundreds, tens, ones) = (it.next().unwrap(), it.next().unwrap(), it.next().unwrap());
                pieces.push(Piece::plain(digit_word(hundreds)));
                if tens == '0' {
                    pieces.push(Piece::plain("oh"));
                    pieces.push(Piece::plain(digit_word(ones)));
                } else {
                    let spelled = self.speller.spell(&digits[1..], SpellRules::Numbering);
                    self.extend_spelled(&mut pieces, &spelled, num_flags);
                }
            } else {
                let spelled = self.speller.spell(&digits, SpellRules::Numbering);
                self.extend_spelled(&mut pieces, &spelled, num_flags);
            }
        } else if num.matches('.').count() > 1 {
            // Version-like strings: groups joined by "point".
            for (i, group) in num.split('.').enumerate() {
                if i > 0 {
                    pieces.push(Piece {
                        word: "point".into(),
                        stress: Some(-2.0),
                        plural: false,
                    });
                }
                if group.is_empty() {
                    continue;
                }
                let spelled = self.speller.spell(group, SpellRules::Numbering);
                self.extend_spelled(&mut pieces, &spelled, num_flags);
            }
        } else if let Some(((major_unit, minor_unit), (major, minor))) = money {
            if major > 0 || minor == 0 {
                let spelled = self.speller.spell(&major.to_string(), SpellRules::Cardinal);
                self.extend_spelled(&mut pieces, &spelled, num_flags);
                pieces.push(Piece {
                    word: major_unit.into(),
                    stress: None,
                    plural: major != 1,
                });
            }
            if minor > 0 {
                if major > 0 {
                    pieces.push(Piece::plain("and"));
                }
                let spelled = self.speller.spell(&minor.to_string(), SpellRules::Cardinal);
                self.extend_spelled(&mut pieces, &spelled, num_flags);
                pieces.push(Piece {
                    word: minor_unit.into(),
                    stress: None,
                    plural: minor != 1 && minor_unit != "pence",
                });
            }
        } else if digits.len() == 4 && currency.is_none() && !num.contains('.') {
            let spelled = self.speller.spell(&digits, SpellRules::NumberingYear);
            self.extend_spelled(&mut pieces, &spelled, num_flags);
        } else {
            let mut parts = num.split('.');
            let integer = parts.next().unwrap_or("");
            if !integer.is_empty() {
                let rules = if is_ordinal {
                    SpellRules::Ordinal
                } else {
                    SpellRules::Cardinal
                };
                let spelled = self.speller.spell(&integer.replace(',', ""), rules);
                self.extend_spelled(&mut pieces, &spelled, num_flags);
            }
            if let Some(frac) = parts.next() {
                pieces.push(Piece {
                    word: "point".into(),
                    stress: Some(-2.0),
                    plural: false,
                });
                for c in frac.chars().filter(char::is_ascii_digit) {
                    pieces.push(Piece::plain(digit_word(c)));
                }
            }
        }

        if pieces.is_empty() {
            log::warn!("no spoken form for numeral '{word}'");
            return (None, None);
        }

        let mut out: Vec<String> = Vec::with_capacity(pieces.len());
        let mut rating = RATING_LEXICON;
        for (i, piece) in pieces.iter().enumerate() {
            if i == 0 && piece.word == "one" && pieces.len() > 1 && num_flags.contains('a') {
                out.push("ə".into());
                continue;
            }
            let (ps, r) = self.lookup(&piece.word, "", piece.stress, None);
            let Some(mut ps) = ps else {
                log::warn!("number word '{}' missing from lexicon", piece.word);
                return (None, None);
            };
            if piece.plural {
                if let Some(plural) = self.append_s(&ps) {
                    ps = plural;
                }
            }
            rating = rating.max(r.unwrap_or(RATING_LEXICON));
            out.push(ps);
        }

        let mut joined = out.join(" ");
        match suffix {
            "" | "st" | "nd" | "rd" | "th" => {}
            "s" | "'s" | "es" => match self.append_s(&joined) {
                Some(ps) => joined = ps,
                None => return (None, None),
            },
            "ed" | "'d" => match self.append_ed(&joined) {
                Some(ps) => joined = ps,
                None => return (None, None),
            },
            "ing" => match self.append_ing(&joined) {
                Some(ps) => joined = ps,
                None => return (None, None),
            },
            "'ll" => joined.push_str("əl"),
            _ => {
                log::warn!("unsupported numeral suffix '{suffix}' in '{word}'");
                return (None, None);
            }
        }
        (Some(joined), Some(rating))
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
    fn numeral_shapes() {
        assert!(is_number("19.99", true));
        assert!(is_number("1,000", true));
        assert!(is_number("-5", true));
        assert!(!is_number("-5", false));
        assert!(is_number("1st", true));
        assert!(is_number("1990s", true));
        assert!(is_number("2'll", true));
        assert!(!is_number("abc", true));
        assert!(!is_number("1x", true));
    }

    #[test]
    fn money_parsing() {
        assert_eq!(parse_money("19.99"), Some((19, 99)));
        assert_eq!(parse_money("5"), Some((5, 0)));
        assert_eq!(parse_money("1,000.5"), Some((1000, 5)));
        assert_eq!(parse_money("1.999"), None);
        assert_eq!(parse_money("1.2.3"), None);
    }

    #[test]
    fn currency_pair_reading() {
        let lex = us();
        let (ps, _) = lex.get_number("19.99", Some("$"), true, "");
        let ps = ps.unwrap();
        assert!(ps.contains("dˈɑlɚz"), "{ps}");
        assert!(ps.contains(" ænd "), "{ps}");
        assert!(ps.contains("sˈɛnts"), "{ps}");
    }

    #[test]
    fn zero_halves_are_omitted() {
        let lex = us();
        let (ps, _) = lex.get_number("0.50", Some("$"), true, "");
        let ps = ps.unwrap();
        assert!(!ps.contains("dˈɑlɚ"), "{ps}");
        assert!(ps.contains("sˈɛnts"), "{ps}");
        let (ps, _) = lex.get_number("1.00", Some("$"), true, "");
        let ps = ps.unwrap();
        assert!(ps.ends_with("dˈɑlɚ"), "{ps}");
    }

    #[test]
    fn years_and_decades() {
        let lex = us();
        let (ps, _) = lex.get_number("1999", None, true, "");
        assert_eq!(ps.as_deref(), Some("nˌIntˈin nˈInɾi nˈIn"));
        let (ps, _) = lex.get_number("1990s", None, true, "");
        assert!(ps.unwrap().ends_with("nˈInɾiz"));
    }

    #[test]
    fn decimals_read_digits() {
        let lex = us();
        let (ps, _) = lex.get_number("3.14", None, true, "");
        let ps = ps.unwrap();
        assert!(ps.starts_with("θɹˈi pYnt"), "{ps}");
        assert!(ps.ends_with("wˈʌn fˈɔɹ"), "{ps}");
    }

    #[test]
    fn continuation_digits() {
        let lex = us();
        // A numeral fragment glued to a word reads digit by digit.
        let (ps, _) = lex.get_number("0042", None, false, "");
        let words: Vec<&str> = ps.as_deref().unwrap().split(' ').collect();
        assert_eq!(words.len(), 4);
        let (ps, _) = lex.get_number("305", None, false, "");
        assert_eq!(ps.as_deref(), Some("θɹˈi ˈO fˈIv"));
    }

    #[test]
    fn ordinals_and_negatives() {
        let lex = us();
        let (ps, _) = lex.get_number("1st", None, true, "");
        assert_eq!(ps.as_deref(), Some("fˈɚst"));
        let (ps, _) = lex.get_number("-5", None, true, "");
        assert!(ps.unwrap().starts_with("mˈInəs "));
    }

    #[test]
    fn contracted_will_suffix() {
        let lex = us();
        let (ps, _) = lex.get_number("2'll", None, true, "");
        assert_eq!(ps.as_deref(), Some("tˈuəl"));
    }
}
