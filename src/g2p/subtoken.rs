use crate::g2p::vocab::is_apostrophe;

fn is_sep(c: char) -> bool {
    c == ',' || c == '.'
}

/// Splits a token's text into its maximal lexical pieces: leading/trailing
/// apostrophe runs, camel-case boundaries, numeral runs (optional leading
/// sign, grouping commas, one decimal point per pair), hyphen/underscore
/// runs, letter runs with embedded single apostrophes (possibly led by an
/// apostrophe glued to a suffix), and lone symbols. Characters that fit no
/// rule (a stray mid-word apostrophe before a non-letter) are dropped.
pub fn subtokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut out = Vec::new();
    let mut i = 0;

    while i < n {
        let c = chars[i];

        // Apostrophe run at the very start of the token.
        if i == 0 && is_apostrophe(c) {
            let mut j = i;
            while j < n && is_apostrophe(chars[j]) {
                j += 1;
            }
            out.push(chars[i..j].iter().collect());
            i = j;
            continue;
        }

        // Lone capital before an Upper+Lower pair: the "A" of "ABc".
        if c.is_uppercase()
            && i + 2 < n
            && chars[i + 1].is_uppercase()
            && chars[i + 2].is_lowercase()
        {
            out.push(c.to_string());
            i += 1;
            continue;
        }

        // Numeral run. A minus sign counts only at the head of the token.
        let numeral_start = c.is_ascii_digit()
            || (is_sep(c) && i + 1 < n && chars[i + 1].is_ascii_digit())
            || (c == '-'
                && i == 0
                && i + 1 < n
                && (chars[i + 1].is_ascii_digit()
                    || (is_sep(chars[i + 1]) && i + 2 < n && chars[i + 2].is_ascii_digit())));
        if numeral_start {
            let mut j = i;
            if chars[j] == '-' {
                j += 1;
            }
            loop {
                if j < n && chars[j].is_ascii_digit() {
                    j += 1;
                } else if j + 1 < n && is_sep(chars[j]) && chars[j + 1].is_ascii_digit() {
                    j += 2;
                } else {
                    break;
                }
            }
            out.push(chars[i..j].iter().collect());
            i = j;
            continue;
        }

        // Hyphen/underscore run.
        if c == '-' || c == '_' {
            let mut j = i;
            while j < n && (chars[j] == '-' || chars[j] == '_') {
                j += 1;
            }
            out.push(chars[i..j].iter().collect());
            i = j;
            continue;
        }

        // A lone apostrophe directly before a letter opens a suffix piece
        // instead: the "'ll" of "2'll" falls through to the letter run.
        if is_apostrophe(c) && (i + 1 >= n || !chars[i + 1].is_alphabetic()) {
            let mut j = i;
            while j < n && is_apostrophe(chars[j]) {
                j += 1;
            }
            // A run of two or more, or a run closing out the token, is kept
            // as a quote piece; a lone interior apostrophe is dropped.
            if j - i >= 2 || j == n {
                out.push(chars[i..j].iter().collect());
            }
            i = j;
            continue;
        }

        // Letter run, allowing single apostrophes between letters and
        // breaking after a lowercase letter that precedes an uppercase one.
        if c.is_alphabetic() || is_apostrophe(c) {
            let mut j = i;
            loop {
                if j < n && chars[j].is_alphabetic() {
                    let camel_break =
                        chars[j].is_lowercase() && j + 1 < n && chars[j + 1].is_uppercase();
                    j += 1;
                    if camel_break {
                        break;
                    }
                } else if j < n
                    && is_apostrophe(chars[j])
                    && j + 1 < n
                    && chars[j + 1].is_alphabetic()
                {
                    j += 1;
                } else {
                    break;
                }
            }
            out.push(chars[i..j].iter().collect());
            i = j;
            continue;
        }

        // Anything else is a lone symbol piece.
        out.push(c.to_string());
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(s: &str) -> Vec<String> {
        subtokenize(s)
    }

    #[test]
    fn plain_words_stay_whole() {
        assert_eq!(split("hello"), vec!["hello"]);
        assert_eq!(split("don't"), vec!["don't"]);
        assert_eq!(split("HTML"), vec!["HTML"]);
    }

    #[test]
    fn camel_case_boundaries() {
        assert_eq!(split("camelCase"), vec!["camel", "Case"]);
        assert_eq!(split("ABc"), vec!["A", "Bc"]);
    }

    #[test]
    fn numerals_keep_grouping_and_decimals() {
        assert_eq!(split("1,234.56"), vec!["1,234.56"]);
        assert_eq!(split("-1.5"), vec!["-1.5"]);
        assert_eq!(split("x-5"), vec!["x", "-", "5"]);
        assert_eq!(split("19.99"), vec!["19.99"]);
    }

    #[test]
    fn mixed_alphanumerics() {
        assert_eq!(split("gr8"), vec!["gr", "8"]);
        assert_eq!(split("2x2"), vec!["2", "x", "2"]);
        assert_eq!(split("$19.99"), vec!["$", "19.99"]);
    }

    #[test]
    fn punctuation_and_quotes() {
        assert_eq!(split("Dr."), vec!["Dr", "."]);
        assert_eq!(split("'tis"), vec!["'", "tis"]);
        assert_eq!(split("cats'"), vec!["cats", "'"]);
        assert_eq!(split("a''b"), vec!["a", "''", "b"]);
        assert_eq!(split("under_score"), vec!["under", "_", "score"]);
    }

    #[test]
    fn numeral_suffixes_keep_their_apostrophe() {
        assert_eq!(split("2'll"), vec!["2", "'ll"]);
        assert_eq!(split("1990's"), vec!["1990", "'s"]);
    }
}
