//! Built-in chat templates

use clap::ValueEnum;
use strum::{Display, EnumIter, EnumProperty, EnumString};

use super::{ImageBlock, RoleMarkers, TemplateConfig};
use crate::tokenizer::SpecialTokenOverrides;

const INTERNVL2_SYSTEM_PROMPT: &str = "你是由上海人工智能实验室联合商汤科技开发的书生多模态大模型，英文名叫InternVL, 是一个有用无害的人工智能助手。";

const LLAMA3_SYSTEM_PROMPT: &str = "用中文回答问题";

/// Llama-3 ends a chat turn with `<|eot_id|>`, not with the vocabulary's `<|end_of_text|>`
const LLAMA3_EOT_ID: u32 = 128009;
const LLAMA3_EOT_TOKEN: &str = "<|eot_id|>";

/// Supported prompt templates
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    Display,
    EnumString,
    ValueEnum,
    EnumProperty,
)]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    /// Encode the text as-is
    #[default]
    #[strum(props(artifact = "tokenizer"))]
    Raw,

    /// InternVL2 chat format with a 256-token image block
    #[strum(props(artifact = "internvl2_tokenizer"))]
    Internvl2,

    /// Llama-3 instruct header format
    #[strum(props(artifact = "llama3_tokenizer"))]
    Llama3,
}

impl Preset {
    /// Local directory conventionally holding this preset's tokenizer
    pub fn default_artifact(&self) -> &'static str {
        self.get_str("artifact").unwrap_or("tokenizer")
    }

    /// The template this preset stands for
    pub fn template(&self) -> TemplateConfig {
        match self {
            Preset::Raw => TemplateConfig::default(),
            Preset::Internvl2 => TemplateConfig {
                prefix: String::new(),
                system: RoleMarkers::new("<|im_start|>system\n", "<|im_end|>"),
                system_prompt: INTERNVL2_SYSTEM_PROMPT.to_string(),
                user: RoleMarkers::new("<|im_start|>user\n", "<|im_end|>"),
                assistant_open: "<|im_start|>assistant\n".to_string(),
                image: Some(ImageBlock {
                    start: "<img>".to_string(),
                    placeholder: "<IMG_CONTEXT>".to_string(),
                    repeat: 256,
                    end: "</img>\n".to_string(),
                }),
            },
            Preset::Llama3 => TemplateConfig {
                prefix: "<|begin_of_text|>".to_string(),
                system: RoleMarkers::new(
                    "<|start_header_id|>system<|end_header_id|>\n\n",
                    LLAMA3_EOT_TOKEN,
                ),
                system_prompt: LLAMA3_SYSTEM_PROMPT.to_string(),
                user: RoleMarkers::new(
                    "<|start_header_id|>user<|end_header_id|>\n\n",
                    LLAMA3_EOT_TOKEN,
                ),
                assistant_open: "<|start_header_id|>assistant<|end_header_id|>".to_string(),
                image: None,
            },
        }
    }

    /// Special token overrides that deployments of this preset commonly pin.
    ///
    /// Not applied unless asked for; the vocabulary's own values win by default.
    pub fn suggested_overrides(&self) -> SpecialTokenOverrides {
        match self {
            Preset::Llama3 => SpecialTokenOverrides {
                eos_id: Some(LLAMA3_EOT_ID),
                eos_token: Some(LLAMA3_EOT_TOKEN.to_string()),
                ..Default::default()
            },
            Preset::Raw | Preset::Internvl2 => SpecialTokenOverrides::default(),
        }
    }
}
