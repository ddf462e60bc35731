//! Wire types of the tokenizer endpoints

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

use crate::tokenizer::TokenId;

/// Wire value for an absent bos/eos id
pub const ABSENT_ID: i64 = -1;

/// Literal body returned for every failed or unknown request
pub const ERROR_BODY: &str = "error";

/// `POST /encode` body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncodeRequest {
    pub text: String,

    #[serde(
        default,
        rename = "imagePrompt",
        alias = "image_prompt",
        alias = "img_prompt"
    )]
    image_prompt: Option<bool>,
}

impl EncodeRequest {
    /// Whether the image placeholder block was requested (null counts as no)
    pub fn image_prompt(&self) -> bool {
        self.image_prompt.unwrap_or(false)
    }
}

/// `POST /decode` body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodeRequest {
    #[serde(rename = "tokenIds", alias = "token_ids")]
    pub token_ids: Vec<TokenId>,
}

/// Response fields whose name depends on the wire naming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireField {
    BosId,
    EosId,
    TokenIds,
    Text,
}

/// Case convention of response field names
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
)]
#[strum(serialize_all = "lowercase")]
pub enum WireNaming {
    /// `bosId`, `eosId`, `tokenIds`
    #[default]
    Camel,
    /// `bos_id`, `eos_id`, `token_ids`, as expected by the C++ runtime client
    Snake,
}

impl WireNaming {
    pub fn key(self, field: WireField) -> &'static str {
        match (self, field) {
            (WireNaming::Camel, WireField::BosId) => "bosId",
            (WireNaming::Camel, WireField::EosId) => "eosId",
            (WireNaming::Camel, WireField::TokenIds) => "tokenIds",
            (WireNaming::Snake, WireField::BosId) => "bos_id",
            (WireNaming::Snake, WireField::EosId) => "eos_id",
            (WireNaming::Snake, WireField::TokenIds) => "token_ids",
            (_, WireField::Text) => "text",
        }
    }

    /// Single-field JSON object keyed by this naming
    pub fn object(self, field: WireField, value: impl Into<Value>) -> Value {
        let mut map = Map::new();
        map.insert(self.key(field).to_string(), value.into());
        Value::Object(map)
    }
}

/// Encode an optional id, substituting [`ABSENT_ID`]
pub fn wire_id(id: Option<TokenId>) -> i64 {
    id.map_or(ABSENT_ID, i64::from)
}
