//! Confirmation prompts and the delete flow that depends on them.

use super::store::Store;
use async_trait::async_trait;
use tracing::{debug, info};

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Upload,
    Delete { file_name: String },
}

impl Prompt {
    pub fn text(&self) -> String {
        match self {
            Self::Upload => "Upload this file?".to_string(),
            Self::Delete { file_name } => format!("Delete \"{file_name}\"? This cannot be undone."),
        }
    }
}

/// The prompt was dismissed instead of confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dismissed")]
pub struct Dismissed;

/// Asks for confirmation; resolves on yes, fails with [`Dismissed`] otherwise.
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &Prompt) -> Result<(), Dismissed>;
}

/// Confirms everything. Backs `--yes`.
pub struct AutoConfirm;

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _prompt: &Prompt) -> Result<(), Dismissed> {
        Ok(())
    }
}

/// Interactive yes/no on the terminal, defaulting to no.
pub struct TerminalConfirm;

#[async_trait]
impl Confirmation for TerminalConfirm {
    async fn confirm(&self, prompt: &Prompt) -> Result<(), Dismissed> {
        let text = prompt.text();
        let answer = tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(text)
                .default(false)
                .interact()
        })
        .await;
        match answer {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(Dismissed),
            Ok(Err(e)) => {
                debug!(error = %e, "confirmation prompt failed");
                Err(Dismissed)
            }
            Err(e) => {
                debug!(error = %e, "confirmation task failed");
                Err(Dismissed)
            }
        }
    }
}

/// Deletes `file_name` once confirmed. A dismissal leaves the store untouched.
pub async fn request_delete(
    store: &mut Store,
    confirmation: &dyn Confirmation,
    file_name: &str,
) -> Result<(), Dismissed> {
    let prompt = Prompt::Delete {
        file_name: file_name.to_string(),
    };
    confirmation.confirm(&prompt).await?;
    store.delete_file(file_name);
    info!(file = %file_name, "file deleted");
    Ok(())
}
