use phonemix::g2p::UNKNOWN_PHONEMES;
use phonemix::{CancelToken, G2p, G2pError};

fn us() -> G2p {
    G2p::english(false).unwrap()
}

#[test]
fn articles_follow_the_next_sound() {
    let g2p = us();
    assert_eq!(g2p.phonemize("a cat").unwrap().phonemes, "ɐ kˈæt");
    assert_eq!(g2p.phonemize("an apple").unwrap().phonemes, "ɐn ˈæpəl");
    assert_eq!(g2p.phonemize("the apple").unwrap().phonemes, "ði ˈæpəl");
    assert_eq!(g2p.phonemize("the cat").unwrap().phonemes, "ðə kˈæt");
}

#[test]
fn used_to_takes_the_past_form() {
    let out = us().phonemize("I used to.").unwrap();
    assert!(out.phonemes.contains("jˈust"), "{}", out.phonemes);
    assert!(!out.phonemes.contains("jˈuzd"), "{}", out.phonemes);
    assert!(out.phonemes.ends_with("tˈu."), "{}", out.phonemes);
}

#[test]
fn currency_reads_both_units() {
    let out = us().phonemize("$19.99").unwrap();
    assert!(out.phonemes.contains("dˈɑlɚz"), "{}", out.phonemes);
    assert!(out.phonemes.contains(" ænd "), "{}", out.phonemes);
    assert!(out.phonemes.contains("sˈɛnts"), "{}", out.phonemes);
}

#[test]
fn abbreviated_title_spells_out() {
    let out = us().phonemize("Dr. Smith").unwrap();
    assert!(out.phonemes.contains("dˌiˈɑɹ"), "{}", out.phonemes);
    assert!(out.phonemes.contains("smˈɪθ"), "{}", out.phonemes);
}

#[test]
fn years_read_in_pairs() {
    let out = us().phonemize("in 1999").unwrap();
    // Flaps are rewritten to T on assembly.
    assert!(out.phonemes.contains("nˌIntˈin nˈInTi nˈIn"), "{}", out.phonemes);
}

#[test]
fn hyphenated_compounds_spread_out() {
    let out = us().phonemize("mother-in-law").unwrap();
    assert_eq!(out.phonemes, "mˈʌðɚ ˈɪn lˈɔ");
}

#[test]
fn inline_phoneme_override_wins() {
    let out = us().phonemize("[Kokoro](/kˈOkəɹO/) says hello").unwrap();
    assert!(out.phonemes.starts_with("kˈOkəɹO"), "{}", out.phonemes);
    let first = &out.tokens[0];
    assert_eq!(first.rating, Some(1));
}

#[test]
fn inline_alias_redirects_lookup() {
    // "to" before a consonant reduces to the unstressed form.
    let out = us().phonemize("[2](#to#) town").unwrap();
    assert!(out.phonemes.starts_with("tə"), "{}", out.phonemes);
    assert!(out.phonemes.ends_with("tˈWn"), "{}", out.phonemes);
}

#[test]
fn unknown_symbols_emit_the_marker() {
    let out = us().phonemize("a §").unwrap();
    assert!(out.phonemes.contains(UNKNOWN_PHONEMES), "{}", out.phonemes);
    assert!(!out.phonemes.is_empty());
}

#[test]
fn token_boundaries_round_trip() {
    let g2p = us();
    for text in ["Dr. Smith met Mrs. Jones.", "a  cat,\nand a dog", "hello world "] {
        let out = g2p.phonemize(text).unwrap();
        let rebuilt: String = out
            .tokens
            .iter()
            .map(|t| format!("{}{}", t.text, t.whitespace))
            .collect();
        assert_eq!(rebuilt, text.trim_start());
    }
}

#[test]
fn junk_runs_terminate_and_resolve_silent() {
    // Groups of unresolvable separator pieces must not loop or panic.
    let out = us().phonemize("cat--- ---dog").unwrap();
    assert!(out.phonemes.contains("kˈæt"), "{}", out.phonemes);
    assert!(out.phonemes.contains("dˈɔɡ"), "{}", out.phonemes);
}

#[test]
fn proper_noun_initialism_spells_letters() {
    let out = us().phonemize("we saw NASA").unwrap();
    assert!(out.phonemes.ends_with("ˌɛnˌAˌɛsˈA"), "{}", out.phonemes);
}

#[test]
fn cancellation_aborts_with_no_output() {
    let g2p = us();
    let cancel = CancelToken::new();
    cancel.cancel();
    let result = g2p.phonemize_with("a cat", &cancel);
    assert!(matches!(result, Err(G2pError::Cancelled)));
}

#[test]
fn british_lexicon_swaps_vowels() {
    let g2p = G2p::english(true).unwrap();
    let out = g2p.phonemize("a cat").unwrap();
    assert_eq!(out.phonemes, "ɐ kˈat");
}

#[test]
fn every_word_contributes_output() {
    let out = us().phonemize("the cat saw a dog in town").unwrap();
    for token in &out.tokens {
        assert!(token.phonemes.is_some(), "unresolved token {:?}", token.text);
    }
}
