//! Ask command handler.
//!
//! Runs one question through the grounded answering pipeline and prints the
//! answer with its sources.

use clap::Args;
use ragchat_core::{AppConfig, AppResult};
use ragchat_knowledge::{ask, AnswerPayload, Question};

use crate::commands::build_state;

/// Ask a question against the document index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output the response payload as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = Question::parse(&self.question)?;
        let state = build_state(config)?;

        let payload = ask(
            &question,
            &state.settings,
            state.search.as_ref(),
            state.llm.as_ref(),
        )
        .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            println!("{}", render_text(&payload));
        }

        Ok(())
    }
}

/// Plain-text rendering: the answer, then one line per source.
fn render_text(payload: &AnswerPayload) -> String {
    let mut out = payload.answer.trim_end().to_string();

    if !payload.sources.is_empty() {
        out.push_str("\n\nSources:");
        for source in &payload.sources {
            out.push_str(&format!("\n  - {} (score: {:.2})", source.source, source.score));
        }
    }

    out
}
