//! Tokenizer adapter over a pretrained tokenizer artifact
//!
//! The tokenizer itself is a black box reached through [`TokenizerBackend`].
//! [`TokenizerAdapter`] adds what the HTTP surface relies on: special token
//! overrides resolved once at load time and a vocabulary range check on
//! decode.

mod error;
pub mod huggingface;
mod special;

// Re-exports for public API
pub use error::{TokenizerError, TokenizerResult};
pub use huggingface::{HuggingFaceBackend, HuggingFaceOptions, SpecialTokenNames};
pub use special::{SpecialTokenInfo, SpecialTokenOverrides};

/// Identifier of one vocabulary entry
pub type TokenId = u32;

/// Trait defining the interface for tokenizer backends
pub trait TokenizerBackend: Send + Sync {
    /// Encode text into token ids
    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>>;

    /// Decode token ids back into text
    fn decode(&self, ids: &[TokenId]) -> TokenizerResult<String>;

    /// Special tokens as reported by the loaded artifact
    fn special_tokens(&self) -> SpecialTokenInfo;

    /// Number of ids in the vocabulary, added tokens included
    fn vocab_size(&self) -> usize;

    /// Look up the id of a token string
    fn token_to_id(&self, token: &str) -> Option<TokenId>;

    /// Look up the token string of an id
    fn id_to_token(&self, id: TokenId) -> Option<String>;
}

/// Read-only tokenizer shared by every request
pub struct TokenizerAdapter {
    backend: Box<dyn TokenizerBackend>,
    special: SpecialTokenInfo,
    vocab_size: usize,
}

impl TokenizerAdapter {
    /// Wrap a backend, resolving special tokens with the given overrides
    pub fn new(backend: Box<dyn TokenizerBackend>, overrides: &SpecialTokenOverrides) -> Self {
        let special = overrides.apply(backend.as_ref());
        let vocab_size = backend.vocab_size();

        Self {
            backend,
            special,
            vocab_size,
        }
    }

    /// Encode already templated text
    pub fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>> {
        self.backend.encode(text)
    }

    /// Decode token ids, rejecting ids outside the vocabulary
    pub fn decode(&self, ids: &[TokenId]) -> TokenizerResult<String> {
        if let Some(id) = ids.iter().find(|&&id| id as usize >= self.vocab_size) {
            return Err(TokenizerError::Decode(format!(
                "token id {} is outside the vocabulary (size {})",
                id, self.vocab_size
            )));
        }

        self.backend.decode(ids)
    }

    pub fn bos_id(&self) -> Option<TokenId> {
        self.special.bos_id
    }

    pub fn eos_id(&self) -> Option<TokenId> {
        self.special.eos_id
    }

    pub fn bos_token(&self) -> Option<&str> {
        self.special.bos_token.as_deref()
    }

    pub fn eos_token(&self) -> Option<&str> {
        self.special.eos_token.as_deref()
    }

    /// All resolved special tokens
    pub fn special_tokens(&self) -> &SpecialTokenInfo {
        &self.special
    }

    /// Vocabulary size captured at load time
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One token per whitespace-separated word, id = word length
    struct MockBackend;

    impl TokenizerBackend for MockBackend {
        fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>> {
            if text.contains('\u{0}') {
                return Err(TokenizerError::Tokenization("NUL in input".to_string()));
            }
            Ok(text.split_whitespace().map(|w| w.len() as TokenId).collect())
        }

        fn decode(&self, ids: &[TokenId]) -> TokenizerResult<String> {
            Ok(ids
                .iter()
                .map(|&id| "x".repeat(id as usize))
                .collect::<Vec<_>>()
                .join(" "))
        }

        fn special_tokens(&self) -> SpecialTokenInfo {
            SpecialTokenInfo {
                bos_id: None,
                eos_id: Some(0),
                bos_token: None,
                eos_token: Some("".to_string()),
            }
        }

        fn vocab_size(&self) -> usize {
            16
        }

        fn token_to_id(&self, _token: &str) -> Option<TokenId> {
            None
        }

        fn id_to_token(&self, id: TokenId) -> Option<String> {
            Some("x".repeat(id as usize))
        }
    }

    fn adapter() -> TokenizerAdapter {
        TokenizerAdapter::new(Box::new(MockBackend), &SpecialTokenOverrides::default())
    }

    #[test]
    fn test_encode_delegates_to_backend() {
        let adapter = adapter();
        assert_eq!(adapter.encode("hello big world").unwrap(), vec![5, 3, 5]);
        assert!(adapter.encode("").unwrap().is_empty());
    }

    #[test]
    fn test_encode_error_is_tokenization_error() {
        let err = adapter().encode("bad\u{0}input").unwrap_err();
        assert!(matches!(err, TokenizerError::Tokenization(_)));
    }

    #[test]
    fn test_decode_rejects_out_of_range_ids() {
        let adapter = adapter();
        assert_eq!(adapter.decode(&[2, 3]).unwrap(), "xx xxx");

        let err = adapter.decode(&[2, 16, 3]).unwrap_err();
        assert!(matches!(err, TokenizerError::Decode(_)));
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn test_special_token_accessors() {
        let adapter = adapter();
        assert_eq!(adapter.bos_id(), None);
        assert_eq!(adapter.bos_token(), None);
        assert_eq!(adapter.eos_id(), Some(0));
        assert_eq!(adapter.vocab_size(), 16);
    }

    #[test]
    fn test_overrides_are_per_instance() {
        let pinned = TokenizerAdapter::new(
            Box::new(MockBackend),
            &SpecialTokenOverrides {
                eos_id: Some(128009),
                eos_token: Some("<|eot_id|>".to_string()),
                ..Default::default()
            },
        );
        let plain = adapter();

        assert_eq!(pinned.eos_id(), Some(128009));
        assert_eq!(pinned.eos_token(), Some("<|eot_id|>"));
        assert_eq!(plain.eos_id(), Some(0));
    }
}
