pub mod g2p;
pub mod speller;
pub mod tagger;

// Re-export key functionality for easy access
pub use g2p::{CancelToken, G2p, G2pError, G2pOutput, Lexicon, Token, TokenContext};
pub use speller::{EnglishSpeller, NumberSpeller, SpellRules};
pub use tagger::{RuleTagger, Tagger};
