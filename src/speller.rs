//! Numeral spelling seam. The lexicon delegates "how do you say 1,234" to a
//! [`NumberSpeller`] so that the phonetic side stays independent of the
//! wording rules.

/// Rule set selecting how a numeral is worded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellRules {
    /// Counting form: "one hundred and one".
    Cardinal,
    /// Ranking form: "one hundred and first".
    Ordinal,
    /// Plain grouping without "and", for digit groups read in sequence.
    Numbering,
    /// Calendar-year form: "nineteen ninety nine".
    NumberingYear,
}

/// Spells numerals out as words. Implementations must fail soft: return an
/// empty string for input they cannot parse, never panic or error.
pub trait NumberSpeller: Send + Sync {
    fn spell(&self, numeral: &str, rules: SpellRules) -> String;
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const SCALES: [(u64, &str); 5] = [
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
    (100, "hundred"),
];

fn under_hundred(n: u64) -> String {
    debug_assert!(n < 100);
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

fn cardinal(n: u64, with_and: bool) -> String {
    if n < 100 {
        return under_hundred(n);
    }
    for (scale, name) in SCALES {
        if n >= scale {
            let mut s = format!("{} {}", cardinal(n / scale, with_and), name);
            let rem = n % scale;
            if rem > 0 {
                if with_and && rem < 100 {
                    s.push_str(" and ");
                } else {
                    s.push(' ');
                }
                s.push_str(&cardinal(rem, with_and));
            }
            return s;
        }
    }
    unreachable!()
}

fn ordinalize(cardinal: &str) -> String {
    let (head, last) = match cardinal.rfind(' ') {
        Some(i) => (&cardinal[..i + 1], &cardinal[i + 1..]),
        None => ("", cardinal),
    };
    let last = match last {
        "one" => "first".to_string(),
        "two" => "second".to_string(),
        "three" => "third".to_string(),
        "five" => "fifth".to_string(),
        "eight" => "eighth".to_string(),
        "nine" => "ninth".to_string(),
        "twelve" => "twelfth".to_string(),
        w if w.ends_with('y') => format!("{}ieth", &w[..w.len() - 1]),
        w => format!("{w}th"),
    };
    format!("{head}{last}")
}

fn year(n: u64) -> String {
    let (high, low) = (n / 100, n % 100);
    if high == 0 || high % 100 == 0 || (high % 10 == 0 && low < 10) {
        return cardinal(n, false);
    }
    let mut s = cardinal(high, false);
    if low == 0 {
        s.push_str(" hundred");
    } else if low < 10 {
        s.push_str(" oh ");
        s.push_str(&cardinal(low, false));
    } else {
        s.push(' ');
        s.push_str(&under_hundred(low));
    }
    s
}

/// English numeral speller used by the bundled lexicons.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishSpeller;

impl NumberSpeller for EnglishSpeller {
    fn spell(&self, numeral: &str, rules: SpellRules) -> String {
        let digits = numeral.replace(',', "");
        let n: u64 = match digits.parse() {
            Ok(n) => n,
            Err(_) => return String::new(),
        };
        match rules {
            SpellRules::Cardinal => cardinal(n, true),
            SpellRules::Ordinal => ordinalize(&cardinal(n, true)),
            SpellRules::Numbering => cardinal(n, false),
            SpellRules::NumberingYear => year(n),
        }
    }
}
