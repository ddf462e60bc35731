//! HuggingFace tokenizer backend

use std::fs;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::Api;
use serde::Deserialize;
use tokenizers::Tokenizer as HfTokenizer;
use tracing::{debug, info, warn};

use super::{SpecialTokenInfo, TokenId, TokenizerBackend};
use crate::tokenizer::error::{TokenizerError, TokenizerResult};

const TOKENIZER_FILE: &str = "tokenizer.json";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";

/// Encode/decode flags forwarded to the `tokenizers` crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuggingFaceOptions {
    /// Run the post-processor on encode (e.g. automatic BOS)
    pub add_special_tokens: bool,
    /// Drop special tokens from decoded text
    pub skip_special_tokens: bool,
}

impl Default for HuggingFaceOptions {
    fn default() -> Self {
        Self {
            add_special_tokens: true,
            skip_special_tokens: false,
        }
    }
}

/// `bos_token` / `eos_token` in `tokenizer_config.json` are either a plain
/// string or a serialized added token
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenSpec {
    Plain(String),
    Added { content: String },
}

impl TokenSpec {
    fn into_content(self) -> String {
        match self {
            TokenSpec::Plain(content) | TokenSpec::Added { content } => content,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenizerConfigFile {
    #[serde(default)]
    bos_token: Option<TokenSpec>,
    #[serde(default)]
    eos_token: Option<TokenSpec>,
}

/// Names of the bos/eos tokens, before they are mapped to ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialTokenNames {
    pub bos: Option<String>,
    pub eos: Option<String>,
}

impl SpecialTokenNames {
    /// Read the names from a `tokenizer_config.json`; a missing file yields no names
    pub fn from_config_file(path: &Path) -> TokenizerResult<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: TokenizerConfigFile = serde_json::from_str(&content).map_err(|e| {
            TokenizerError::Load(format!("corrupt {}: {}", path.display(), e))
        })?;

        Ok(Self {
            bos: config.bos_token.map(TokenSpec::into_content),
            eos: config.eos_token.map(TokenSpec::into_content),
        })
    }
}

/// Backend over a `tokenizers::Tokenizer` loaded from a `tokenizer.json`
pub struct HuggingFaceBackend {
    tokenizer: HfTokenizer,
    special: SpecialTokenInfo,
    options: HuggingFaceOptions,
}

impl HuggingFaceBackend {
    /// Load from a `tokenizer.json` file, a directory holding one, or a Hub model id
    pub fn load(artifact: &str, options: HuggingFaceOptions) -> TokenizerResult<Self> {
        let path = Path::new(artifact);

        let (file, config) = if path.exists() {
            let (file, config) = artifact_files(path);
            (file, Some(config))
        } else {
            info!("{} is not a local path, fetching from the HuggingFace Hub", artifact);
            hub_files(artifact)?
        };

        Self::from_files(&file, config.as_deref(), options)
    }

    /// Load a `tokenizer.json` and take bos/eos names from an optional `tokenizer_config.json`
    pub fn from_files(
        file: &Path,
        config: Option<&Path>,
        options: HuggingFaceOptions,
    ) -> TokenizerResult<Self> {
        info!("Loading tokenizer from {}", file.display());

        let tokenizer = HfTokenizer::from_file(file)
            .map_err(|e| TokenizerError::Load(format!("{}: {}", file.display(), e)))?;
        let names = match config {
            Some(config) => SpecialTokenNames::from_config_file(config)?,
            None => SpecialTokenNames::default(),
        };

        Ok(Self::from_tokenizer(tokenizer, names, options))
    }

    /// Wrap an already constructed tokenizer
    pub fn from_tokenizer(
        tokenizer: HfTokenizer,
        names: SpecialTokenNames,
        options: HuggingFaceOptions,
    ) -> Self {
        let bos_id = names.bos.as_deref().and_then(|t| tokenizer.token_to_id(t));
        let eos_id = names.eos.as_deref().and_then(|t| tokenizer.token_to_id(t));
        debug!(?names, ?bos_id, ?eos_id, "Resolved special tokens");

        Self {
            special: SpecialTokenInfo {
                bos_id,
                eos_id,
                bos_token: names.bos,
                eos_token: names.eos,
            },
            tokenizer,
            options,
        }
    }
}

/// Download the tokenizer and, if the repo has one, its config into the Hub cache
fn hub_files(model_id: &str) -> TokenizerResult<(PathBuf, Option<PathBuf>)> {
    let api = Api::new().map_err(|e| TokenizerError::Load(format!("HuggingFace Hub: {}", e)))?;
    let repo = api.model(model_id.to_string());

    let file = repo
        .get(TOKENIZER_FILE)
        .map_err(|e| TokenizerError::Load(format!("{}: {}", model_id, e)))?;
    let config = match repo.get(TOKENIZER_CONFIG_FILE) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("{} has no usable {}: {}", model_id, TOKENIZER_CONFIG_FILE, e);
            None
        }
    };

    Ok((file, config))
}

/// Tokenizer file and sibling config file for a local artifact path
fn artifact_files(path: &Path) -> (PathBuf, PathBuf) {
    if path.is_dir() {
        (path.join(TOKENIZER_FILE), path.join(TOKENIZER_CONFIG_FILE))
    } else {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        (path.to_path_buf(), dir.join(TOKENIZER_CONFIG_FILE))
    }
}

impl TokenizerBackend for HuggingFaceBackend {
    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>> {
        let encoding = self
            .tokenizer
            .encode(text, self.options.add_special_tokens)
            .map_err(|e| TokenizerError::Tokenization(format!("Failed to encode text: {}", e)))?;

        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[TokenId]) -> TokenizerResult<String> {
        self.tokenizer
            .decode(ids, self.options.skip_special_tokens)
            .map_err(|e| TokenizerError::Decode(format!("Failed to decode ids: {}", e)))
    }

    fn special_tokens(&self) -> SpecialTokenInfo {
        self.special.clone()
    }

    fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.tokenizer.token_to_id(token)
    }

    fn id_to_token(&self, id: TokenId) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_config_names_plain_and_added_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(TOKENIZER_CONFIG_FILE);
        write(
            &path,
            r#"{
                "bos_token": "<s>",
                "eos_token": {"content": "</s>", "lstrip": false, "special": true},
                "model_max_length": 4096
            }"#,
        );

        let names = SpecialTokenNames::from_config_file(&path).unwrap();
        assert_eq!(names.bos.as_deref(), Some("<s>"));
        assert_eq!(names.eos.as_deref(), Some("</s>"));
    }

    #[test]
    fn test_config_names_null_and_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(TOKENIZER_CONFIG_FILE);
        write(&path, r#"{"bos_token": null, "eos_token": "<|im_end|>"}"#);

        let names = SpecialTokenNames::from_config_file(&path).unwrap();
        assert_eq!(names.bos, None);
        assert_eq!(names.eos.as_deref(), Some("<|im_end|>"));

        let absent = SpecialTokenNames::from_config_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(absent, SpecialTokenNames::default());
    }

    #[test]
    fn test_corrupt_config_is_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(TOKENIZER_CONFIG_FILE);
        write(&path, "{ not json");

        let err = SpecialTokenNames::from_config_file(&path).unwrap_err();
        assert!(matches!(err, TokenizerError::Load(_)));
    }

    #[test]
    fn test_artifact_files_for_dir_and_file() {
        let dir = tempdir().unwrap();
        let (file, config) = artifact_files(dir.path());
        assert_eq!(file, dir.path().join(TOKENIZER_FILE));
        assert_eq!(config, dir.path().join(TOKENIZER_CONFIG_FILE));

        let custom = dir.path().join("custom.json");
        write(&custom, "{}");
        let (file, config) = artifact_files(&custom);
        assert_eq!(file, custom);
        assert_eq!(config, dir.path().join(TOKENIZER_CONFIG_FILE));
    }

    #[test]
    fn test_from_files_resolves_names_to_ids() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(TOKENIZER_FILE);
        let config = dir.path().join(TOKENIZER_CONFIG_FILE);
        write(&file, include_str!("../../tests/fixtures/tokenizer.json"));
        write(&config, include_str!("../../tests/fixtures/tokenizer_config.json"));

        let backend =
            HuggingFaceBackend::from_files(&file, Some(&config), HuggingFaceOptions::default())
                .unwrap();
        let special = backend.special_tokens();
        assert_eq!(special.bos_id, Some(0));
        assert_eq!(special.eos_id, Some(1));
        assert_eq!(special.eos_token.as_deref(), Some("</s>"));

        // a Hub repo without a config file
        let bare = HuggingFaceBackend::from_files(&file, None, HuggingFaceOptions::default())
            .unwrap();
        assert_eq!(bare.special_tokens(), SpecialTokenInfo::default());
    }

    #[test]
    #[ignore = "downloads from the HuggingFace Hub"]
    fn test_hub_model_resolves_special_tokens() {
        let backend = HuggingFaceBackend::load(
            "TinyLlama/TinyLlama-1.1B-Chat-v1.0",
            HuggingFaceOptions::default(),
        )
        .unwrap();

        let special = backend.special_tokens();
        assert_eq!(special.bos_id, Some(1));
        assert_eq!(special.bos_token.as_deref(), Some("<s>"));
        assert_eq!(special.eos_id, Some(2));
        assert_eq!(special.eos_token.as_deref(), Some("</s>"));
    }

    #[test]
    fn test_corrupt_tokenizer_file_is_load_error() {
        let dir = tempdir().unwrap();
        write(&dir.path().join(TOKENIZER_FILE), "{\"model\": 1}");

        let err = HuggingFaceBackend::load(
            dir.path().to_str().unwrap(),
            HuggingFaceOptions::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, TokenizerError::Load(_)));
    }
}
