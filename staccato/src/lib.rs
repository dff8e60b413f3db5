//! # Staccato
//!
//! Staccato is a deterministic pattern-based Japanese morphological
//! analyzer. Analysis is a single longest-prefix-match pass over a
//! compiled pattern dictionary, conditioned on the previous token's
//! part of speech; there is no lattice and no statistical decoding.
//!
//! ## Examples
//!
//! ```
//! use staccato::dictionary::{Dictionary, ModelData};
//! use staccato::Tokenizer;
//!
//! let patterns = "9\t猫\t\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n\
//!                 5\tである\t\t9\t3\t助動詞,*,*,*,である,である\n";
//! let data = ModelData::compile(patterns.as_bytes()).unwrap();
//! let tokenizer = Tokenizer::new(Dictionary::from_model(data));
//!
//! let tokens = tokenizer.tokenize("猫である");
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].surface(), "猫");
//! assert_eq!(tokens[1].surface(), "である");
//! ```
#![deny(missing_docs)]

#[cfg(target_pointer_width = "16")]
compile_error!("`target_pointer_width` must be larger than or equal to 32");

pub mod common;
pub mod dictionary;
pub mod errors;
mod interner;
pub mod token;
pub mod tokenizer;
pub mod trainer;
mod trie;
mod utf8;
mod utils;

#[cfg(test)]
mod tests;

pub use dictionary::Dictionary;
pub use token::Token;
pub use tokenizer::{OutputMode, Tokenizer};
