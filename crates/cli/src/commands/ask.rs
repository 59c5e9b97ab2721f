//! Ask command handler.
//!
//! Retrieves relevant passages from the indexed corpus and generates a
//! grounded answer via the reasoning backend.

use clap::Args;
use futures::StreamExt;
use thermo_core::{config::AppConfig, AppResult};
use thermo_llm::{create_client, LlmRequest};
use thermo_retrieval::{create_provider, Chunk, VectorIndex};

/// Ask a question against the indexed corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of context passages to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print retrieved passages without calling the reasoning backend
    #[arg(long)]
    pub retrieve_only: bool,

    /// Disable streaming output
    #[arg(long)]
    pub no_stream: bool,

    /// Maximum tokens in the answer
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Temperature for answer generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let index = VectorIndex::new(config.index_dir());
        index.load();

        let provider = create_provider(&config.embedding)?;
        let query_embedding = provider.embed(&self.question).await?;

        // An unloaded index surfaces IndexNotReady here, which tells the
        // user to run the ingest step.
        let k = self.top_k.unwrap_or(config.top_k);
        let chunks = index.query(&query_embedding, k)?;

        tracing::info!("Retrieved {} passages for the question", chunks.len());

        if self.retrieve_only {
            return self.print_passages(&chunks);
        }

        let context = build_context(&chunks);
        let user_prompt = format!(
            "Question:\n{}\n\nRelevant passages from the corpus:\n{}",
            self.question, context
        );

        let client = create_client(&config.provider, config.endpoint.as_deref(), None)?;

        let mut request =
            LlmRequest::new(user_prompt, &config.model).with_system(system_prompt());

        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        } else {
            // Lower temperature for factual answers
            request = request.with_temperature(0.3);
        }

        if self.no_stream || self.json {
            self.answer_non_streaming(client.as_ref(), &request, &chunks, config)
                .await
        } else {
            self.answer_streaming(client.as_ref(), &request).await
        }
    }

    /// Print retrieved passages and stop.
    fn print_passages(&self, chunks: &[Chunk]) -> AppResult<()> {
        if self.json {
            let json = serde_json::to_string_pretty(chunks)
                .map_err(|e| thermo_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            for chunk in chunks {
                println!("[{}] {}", chunk.id, chunk.text);
                println!();
            }
        }
        Ok(())
    }

    async fn answer_non_streaming(
        &self,
        client: &dyn thermo_llm::LlmClient,
        request: &LlmRequest,
        chunks: &[Chunk],
        config: &AppConfig,
    ) -> AppResult<()> {
        let response = client.complete(request).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": response.content,
                "model": response.model,
                "provider": config.provider,
                "passages": chunks.iter().map(|c| c.id).collect::<Vec<_>>(),
                "usage": {
                    "promptTokens": response.usage.prompt_tokens,
                    "completionTokens": response.usage.completion_tokens,
                    "totalTokens": response.usage.total_tokens
                }
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| thermo_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", response.content);
        }

        Ok(())
    }

    async fn answer_streaming(
        &self,
        client: &dyn thermo_llm::LlmClient,
        request: &LlmRequest,
    ) -> AppResult<()> {
        let mut stream = client.stream(request).await?;

        while let Some(result) = stream.next().await {
            let chunk = result?;

            if !chunk.content.is_empty() {
                print!("{}", chunk.content);
                use std::io::Write;
                std::io::stdout().flush().ok();
            }

            if chunk.done {
                if let Some(usage) = chunk.usage {
                    tracing::debug!(
                        "Token usage - Prompt: {}, Completion: {}, Total: {}",
                        usage.prompt_tokens,
                        usage.completion_tokens,
                        usage.total_tokens
                    );
                }
                break;
            }
        }

        println!();
        Ok(())
    }
}

/// Build the context block handed to the reasoning backend.
fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Passage {}]\n{}", i + 1, chunk.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn system_prompt() -> String {
    String::from(
        "You are a study assistant with access to passages from the user's reference material.\n\n\
         Instructions:\n\
         - Answer based only on the passages provided\n\
         - Do not refer to \"passages\", \"chunks\", or passage numbers in the answer\n\
         - If the passages do not contain the answer, say: \"I could not find this in the available material.\"\n\
         - Keep the answer concise and factual\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_numbers_passages() {
        let chunks = vec![
            Chunk {
                id: 0,
                text: "First passage".to_string(),
            },
            Chunk {
                id: 7,
                text: "  Second passage  ".to_string(),
            },
        ];

        let context = build_context(&chunks);
        assert!(context.contains("[Passage 1]\nFirst passage"));
        assert!(context.contains("[Passage 2]\nSecond passage"));
        assert!(context.contains("---"));
    }

    #[test]
    fn test_system_prompt_mentions_grounding() {
        let prompt = system_prompt();
        assert!(prompt.contains("only on the passages"));
        assert!(prompt.contains("could not find"));
    }
}
