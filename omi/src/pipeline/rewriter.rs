use crate::llm::prompts::rewrite_prompt;
use crate::llm::PromptBackend;
use crate::routing::ModeRule;

/// Rewrites `prompt` through the intermediary model under `rule`.
///
/// Rewriting is advisory: any failure (transport, auth, timeout, blank or
/// malformed reply) returns `prompt` unchanged.
pub async fn rewrite(prompt: &str, rule: &ModeRule, intermediary: &dyn PromptBackend) -> String {
    let composite = rewrite_prompt(&rule.instruction, prompt);

    match intermediary.submit(&composite).await {
        Ok(rewritten) if !rewritten.trim().is_empty() => {
            tracing::debug!(
                mode = %rule.mode,
                original_len = prompt.len(),
                rewritten_len = rewritten.len(),
                "Prompt rewritten"
            );
            rewritten
        }
        Ok(_) => {
            tracing::warn!(mode = %rule.mode, "Prompt rewrite came back empty, using original");
            prompt.to_string()
        }
        Err(error) => {
            tracing::warn!(mode = %rule.mode, error = %error, "Prompt rewrite failed, using original");
            prompt.to_string()
        }
    }
}
