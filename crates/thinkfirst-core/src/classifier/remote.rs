//! Chat-completions client for prompt analysis.
//!
//! Two requests against the same endpoint: an analysis call (is this prompt
//! lazy or learning-focused?) and a rewrite call (phrase it as a learning
//! question). Both expect the assistant message content to itself be a JSON
//! object.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::PromptAnalysis;
use crate::error::ClassifyError;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

const ANALYZE_SYSTEM_PROMPT: &str = r#"You are an AI usage analyzer that determines if a prompt represents "lazy" usage of AI or good learning behavior.

VERY IMPORTANT - These are considered LAZY usage and should be flagged:
1. Copy-pasted assignment/homework text (look for telltale signs like "TODO:", "The Problem", file descriptions, testing instructions)
2. Direct requests for solutions without showing work/understanding
3. Asking AI to write complete or fix code/essays ("Write a function," "Fix this code/essay," "Tell me what's wrong in this")
4. Direct requests like "solve this" or "help with this homework"
5. Any text that appears to be directly copied from a course assignment (IMPORTANT: If the prompt looks a question with a numerical answer or a multiple choice options, it's likely copy-pasted)

These are considered GOOD LEARNING behavior and should be flagged as learning:
1. Asking for explanations of concepts
2. Requesting help with specific parts after showing attempt
3. Asking about best practices or approaches
4. Seeking to understand why something works
5. Asking for guidance on problem-solving approach
6. Breaking down complex problems
7. Comparing different solutions or methods

Respond with a JSON object containing:
{
  "isLazy": boolean,
  "isLearning": boolean,
  "reason": string (explain VERY BRIEFLY why it was flagged as lazy or learning)
}"#;

const REWRITE_SYSTEM_PROMPT: &str = r#"You are an AI tutor that helps students rephrase their questions to focus on learning and understanding.
Your task is to convert "lazy" prompts that ask for direct solutions into learning-focused prompts that:
1. Ask for explanations and understanding
2. Show willingness to learn and engage with the material
3. Request guidance rather than solutions
4. Break down complex problems into smaller parts
5. Focus on concepts and principles

IMPORTANT: Keep the rephrased prompt around the same length or a little longer than the original prompt.

For example:
- "Write code to sort an array" -> "Can you explain the different sorting algorithms and help me understand which one would be most efficient for my use case? I'd like to implement it myself."
- "Solve this math problem" -> "I'm stuck on this math problem. Could you help me understand the key concepts involved and guide me through the problem-solving approach?"

Respond with a JSON object containing:
{
  "learningPrompt": string (the rephrased learning-focused prompt),
}"#;

/// Verdict shape inside the assistant message content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteVerdict {
    is_lazy: bool,
    is_learning: bool,
    #[serde(default)]
    reason: String,
}

/// Rewrite shape inside the assistant message content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteRewrite {
    learning_prompt: String,
}

/// Client for the remote classification service.
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl RemoteClassifier {
    pub fn new(endpoint: String, model: String, api_key: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Ask the service whether `prompt` is lazy or learning-focused.
    pub async fn analyze(&self, prompt: &str) -> Result<PromptAnalysis, ClassifyError> {
        let content = self.chat(ANALYZE_SYSTEM_PROMPT, prompt, 0.3, 150).await?;
        let verdict: RemoteVerdict = serde_json::from_str(&content)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;
        Ok(PromptAnalysis {
            is_lazy: verdict.is_lazy,
            is_learning: verdict.is_learning,
            reason: verdict.reason,
            suggested_prompt: None,
        })
    }

    /// Best-effort learning-focused rewrite of a lazy prompt.
    pub async fn rewrite(&self, prompt: &str) -> Result<String, ClassifyError> {
        let content = self.chat(REWRITE_SYSTEM_PROMPT, prompt, 0.7, 200).await?;
        let rewrite: RemoteRewrite = serde_json::from_str(&content)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;
        Ok(rewrite.learning_prompt)
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ClassifyError> {
        if self.api_key.is_empty() {
            return Err(ClassifyError::MissingApiKey);
        }

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": temperature,
            "max_tokens": max_tokens
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifyError::Status { status, body });
        }

        let payload: serde_json::Value = resp.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ClassifyError::MalformedResponse("missing choices[0].message.content".to_string())
            })
    }
}
