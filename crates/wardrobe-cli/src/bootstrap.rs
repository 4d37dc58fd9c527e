use std::sync::Arc;

use anyhow::{Context, Result};
use wardrobe_application::EditSession;
use wardrobe_core::config::WardrobeConfig;
use wardrobe_infrastructure::{SecretServiceImpl, WardrobePaths};
use wardrobe_interaction::GeminiImageAgent;

/// Composition root: secrets, Gemini backend and a fresh session.
pub async fn build_session(paths: &WardrobePaths, config: &WardrobeConfig) -> Result<EditSession> {
    let secret_service = SecretServiceImpl::new(paths)?;
    let agent = GeminiImageAgent::try_from_secrets(&secret_service, config)
        .await
        .context("Gemini is not configured. Run `wardrobe init` and add your API key, or set GEMINI_API_KEY")?;

    tracing::info!("[Bootstrap] Using Gemini model {}", agent.model());
    let session = EditSession::from_backend(Arc::new(agent), config)?;
    Ok(session)
}
