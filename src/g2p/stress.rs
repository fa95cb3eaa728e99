use crate::g2p::vocab::{
    is_diphthong, is_stress, is_vowel, PRIMARY_STRESS, SECONDARY_STRESS,
};

/// Re-sorts a phoneme string so that every stress mark sits immediately
/// before the vowel it governs. Used after injecting a mark at the front.
fn restress(ps: &str) -> String {
    let chars: Vec<char> = ps.chars().collect();
    let mut keyed: Vec<(f32, char)> = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as f32, c))
        .collect();
    for i in 0..chars.len() {
        if is_stress(chars[i]) {
            if let Some(j) = (i..chars.len()).find(|&j| is_vowel(chars[j])) {
                keyed[i].0 = j as f32 - 0.5;
            }
        }
    }
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    keyed.into_iter().map(|(_, c)| c).collect()
}

/// Applies a stress directive to a phoneme string.
///
/// `None` leaves the string untouched. Negative values strip or demote,
/// positive values inject or promote; half steps bias without forcing.
pub fn apply_stress(ps: &str, stress: Option<f32>) -> String {
    let stress = match stress {
        Some(s) => s,
        None => return ps.to_string(),
    };
    let has_primary = ps.contains(PRIMARY_STRESS);
    let has_secondary = ps.contains(SECONDARY_STRESS);
    let has_any = has_primary || has_secondary;

    if stress < -1.0 {
        ps.replace(PRIMARY_STRESS, "").replace(SECONDARY_STRESS, "")
    } else if (stress == -1.0 || stress == 0.0 || stress == -0.5) && has_primary {
        ps.replace(SECONDARY_STRESS, "")
            .replace(PRIMARY_STRESS, &SECONDARY_STRESS.to_string())
    } else if (stress == 0.0 || stress == 0.5 || stress == 1.0) && !has_any {
        if !ps.chars().any(is_vowel) {
            ps.to_string()
        } else {
            restress(&format!("{SECONDARY_STRESS}{ps}"))
        }
    } else if stress >= 1.0 && !has_primary && has_secondary {
        ps.replace(SECONDARY_STRESS, &PRIMARY_STRESS.to_string())
    } else if stress > 1.0 && !has_any {
        if !ps.chars().any(is_vowel) {
            ps.to_string()
        } else {
            restress(&format!("{PRIMARY_STRESS}{ps}"))
        }
    } else {
        ps.to_string()
    }
}

/// Length of a phoneme string with diphthongs counted twice. Used to rank
/// which token of a merged span keeps its primary stress.
pub fn stress_weight(ps: &str) -> usize {
    ps.chars()
        .map(|c| if is_diphthong(c) { 2 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        assert_eq!(apply_stress("kˈæt", None), "kˈæt");
    }

    #[test]
    fn strip_below_minus_one() {
        assert_eq!(apply_stress("kˈætˌæt", Some(-2.0)), "kætæt");
    }

    #[test]
    fn demote_is_idempotent() {
        let once = apply_stress("kˈæt", Some(-1.0));
        assert_eq!(once, "kˌæt");
        let twice = apply_stress(&once, Some(-1.0));
        assert_eq!(twice, once);
        assert!(!twice.contains(PRIMARY_STRESS));
    }

    #[test]
    fn inject_secondary_before_vowel() {
        // No existing marks: a secondary mark lands before the first vowel.
        assert_eq!(apply_stress("kæt", Some(0.5)), "kˌæt");
        // No vowel at all: unchanged.
        assert_eq!(apply_stress("st", Some(0.5)), "st");
    }

    #[test]
    fn promote_secondary() {
        assert_eq!(apply_stress("kˌæt", Some(2.0)), "kˈæt");
        assert_eq!(apply_stress("kæt", Some(2.0)), "kˈæt");
    }

    #[test]
    fn weights_count_diphthongs_twice() {
        assert_eq!(stress_weight("kæt"), 3);
        assert_eq!(stress_weight("kAt"), 4);
    }
}
