//! Special token metadata and per-instance override policy

use super::{TokenId, TokenizerBackend};

/// Beginning/end-of-sequence tokens resolved at load time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialTokenInfo {
    pub bos_id: Option<TokenId>,
    pub eos_id: Option<TokenId>,
    pub bos_token: Option<String>,
    pub eos_token: Option<String>,
}

/// Values that replace whatever the backend reports for bos/eos.
///
/// Some deployments pin the eos token to a chat turn terminator (Llama-3 uses
/// `<|eot_id|>` = 128009) instead of the vocabulary's end-of-text token. That
/// choice belongs to the deployment, so it is expressed here rather than in
/// the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialTokenOverrides {
    pub bos_id: Option<TokenId>,
    pub bos_token: Option<String>,
    pub eos_id: Option<TokenId>,
    pub eos_token: Option<String>,
}

impl SpecialTokenOverrides {
    /// True when no field is overridden
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: SpecialTokenOverrides) -> Self {
        Self {
            bos_id: self.bos_id.or(fallback.bos_id),
            bos_token: self.bos_token.or(fallback.bos_token),
            eos_id: self.eos_id.or(fallback.eos_id),
            eos_token: self.eos_token.or(fallback.eos_token),
        }
    }

    /// Apply the overrides on top of the backend's own special tokens.
    ///
    /// An overridden id without a token string takes the string from the
    /// vocabulary, and an overridden string without an id is looked up in it.
    pub fn apply(&self, backend: &dyn TokenizerBackend) -> SpecialTokenInfo {
        let base = backend.special_tokens();
        let (bos_id, bos_token) = resolve(
            backend,
            (base.bos_id, base.bos_token),
            self.bos_id,
            self.bos_token.as_deref(),
        );
        let (eos_id, eos_token) = resolve(
            backend,
            (base.eos_id, base.eos_token),
            self.eos_id,
            self.eos_token.as_deref(),
        );

        SpecialTokenInfo {
            bos_id,
            eos_id,
            bos_token,
            eos_token,
        }
    }
}

fn resolve(
    backend: &dyn TokenizerBackend,
    base: (Option<TokenId>, Option<String>),
    id: Option<TokenId>,
    token: Option<&str>,
) -> (Option<TokenId>, Option<String>) {
    match (id, token) {
        (Some(id), Some(token)) => (Some(id), Some(token.to_string())),
        (Some(id), None) => (Some(id), backend.id_to_token(id)),
        (None, Some(token)) => (backend.token_to_id(token), Some(token.to_string())),
        (None, None) => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TokenizerResult;

    struct FixedVocab;

    impl TokenizerBackend for FixedVocab {
        fn encode(&self, _text: &str) -> TokenizerResult<Vec<TokenId>> {
            Ok(Vec::new())
        }

        fn decode(&self, _ids: &[TokenId]) -> TokenizerResult<String> {
            Ok(String::new())
        }

        fn special_tokens(&self) -> SpecialTokenInfo {
            SpecialTokenInfo {
                bos_id: Some(1),
                eos_id: Some(2),
                bos_token: Some("<s>".to_string()),
                eos_token: Some("</s>".to_string()),
            }
        }

        fn vocab_size(&self) -> usize {
            10
        }

        fn token_to_id(&self, token: &str) -> Option<TokenId> {
            (token == "<|eot_id|>").then_some(7)
        }

        fn id_to_token(&self, id: TokenId) -> Option<String> {
            (id == 7).then(|| "<|eot_id|>".to_string())
        }
    }

    #[test]
    fn test_no_overrides_keeps_backend_values() {
        let info = SpecialTokenOverrides::default().apply(&FixedVocab);
        assert_eq!(info, FixedVocab.special_tokens());
    }

    #[test]
    fn test_pinned_eos_ignores_vocabulary() {
        let overrides = SpecialTokenOverrides {
            eos_id: Some(128009),
            eos_token: Some("<|eot_id|>".to_string()),
            ..Default::default()
        };
        let info = overrides.apply(&FixedVocab);

        assert_eq!(info.eos_id, Some(128009));
        assert_eq!(info.eos_token.as_deref(), Some("<|eot_id|>"));
        assert_eq!(info.bos_id, Some(1));
    }

    #[test]
    fn test_partial_override_is_completed_from_vocabulary() {
        let by_token = SpecialTokenOverrides {
            eos_token: Some("<|eot_id|>".to_string()),
            ..Default::default()
        }
        .apply(&FixedVocab);
        assert_eq!(by_token.eos_id, Some(7));

        let by_id = SpecialTokenOverrides {
            eos_id: Some(7),
            ..Default::default()
        }
        .apply(&FixedVocab);
        assert_eq!(by_id.eos_token.as_deref(), Some("<|eot_id|>"));

        let unknown = SpecialTokenOverrides {
            bos_token: Some("<missing>".to_string()),
            ..Default::default()
        }
        .apply(&FixedVocab);
        assert_eq!(unknown.bos_id, None);
        assert_eq!(unknown.bos_token.as_deref(), Some("<missing>"));
    }

    #[test]
    fn test_or_prefers_explicit_values() {
        let explicit = SpecialTokenOverrides {
            eos_id: Some(5),
            ..Default::default()
        };
        let suggested = SpecialTokenOverrides {
            eos_id: Some(128009),
            eos_token: Some("<|eot_id|>".to_string()),
            ..Default::default()
        };

        let merged = explicit.or(suggested);
        assert_eq!(merged.eos_id, Some(5));
        assert_eq!(merged.eos_token.as_deref(), Some("<|eot_id|>"));
        assert!(!merged.is_empty());
        assert!(SpecialTokenOverrides::default().is_empty());
    }
}
