/*!
 * Startup report for tokserve
 *
 * Prints what the server is about to serve: the tokenizer artifact, the
 * template, the resolved special tokens and a sample encoding, using the
 * tabled library for table rendering.
 */

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::tokenizer::{SpecialTokenInfo, TokenId};

/// Text encoded at startup as a smoke test
pub const SAMPLE_TEXT: &str = "hello world";

/// Summary of a loaded service
#[derive(Debug, Clone)]
pub struct StartupReport {
    /// Address the server binds
    pub bind_addr: String,
    /// Tokenizer artifact as given on the command line
    pub artifact: String,
    /// Template name or file
    pub template: String,
    /// Vocabulary size, added tokens included
    pub vocab_size: usize,
    /// Resolved special tokens
    pub special: SpecialTokenInfo,
    /// Templated encoding of [`SAMPLE_TEXT`], if it succeeded
    pub sample: Option<Vec<TokenId>>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Setting")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

fn format_special(id: Option<TokenId>, token: Option<&str>) -> String {
    match (id, token) {
        (Some(id), Some(token)) => format!("{} ({:?})", id, token),
        (Some(id), None) => id.to_string(),
        (None, Some(token)) => format!("-1 ({:?}, not in vocabulary)", token),
        (None, None) => "-1 (absent)".to_string(),
    }
}

fn format_sample(sample: Option<&[TokenId]>) -> String {
    const SHOWN: usize = 8;

    match sample {
        None => "failed".to_string(),
        Some(ids) if ids.len() <= SHOWN => format!("{:?} ({} tokens)", ids, ids.len()),
        Some(ids) => format!(
            "[{}, ..., {}] ({} tokens)",
            ids[..SHOWN / 2]
                .iter()
                .map(TokenId::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            ids[ids.len() - SHOWN / 2..]
                .iter()
                .map(TokenId::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            ids.len()
        ),
    }
}

impl StartupReport {
    /// Render the report as a console table
    pub fn render(&self) -> String {
        let rows = vec![
            SummaryRow::new("🌐 Listening", format!("http://{}", self.bind_addr)),
            SummaryRow::new("📦 Tokenizer", self.artifact.clone()),
            SummaryRow::new("📝 Template", self.template.clone()),
            SummaryRow::new("🔢 Vocabulary", self.vocab_size.to_string()),
            SummaryRow::new(
                "▶️ BOS",
                format_special(self.special.bos_id, self.special.bos_token.as_deref()),
            ),
            SummaryRow::new(
                "⏹️ EOS",
                format_special(self.special.eos_id, self.special.eos_token.as_deref()),
            ),
            SummaryRow::new(
                &format!("🧪 Encode {:?}", SAMPLE_TEXT),
                format_sample(self.sample.as_deref()),
            ),
        ];

        // Create and style the table
        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        format!("✅  TOKENIZER SERVICE READY\n{}", table)
    }

    /// Print the report to stdout
    pub fn print(&self) {
        println!("\n{}", self.render());
    }
}
