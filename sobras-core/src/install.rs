//! "Add to home screen" banner.
//!
//! The platform announces installability by handing over a deferred prompt.
//! The banner stays visible until dismissed or accepted; accepting fires the
//! prompt, which can only be used once.

use async_trait::async_trait;

/// The user's answer to the platform install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

/// A platform install prompt, held until the user asks for it.
#[async_trait]
pub trait DeferredInstallPrompt: Send {
    /// Show the prompt and wait for the user's choice.
    async fn prompt(self: Box<Self>) -> InstallOutcome;
}

#[derive(Default)]
pub struct InstallPrompt {
    deferred: Option<Box<dyn DeferredInstallPrompt>>,
    banner_visible: bool,
}

impl InstallPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform reports the app can be installed.
    pub fn on_installable(&mut self, prompt: Box<dyn DeferredInstallPrompt>) {
        self.deferred = Some(prompt);
        self.banner_visible = true;
        tracing::debug!("Install prompt deferred");
    }

    pub fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    /// Hide the banner. The deferred prompt is kept.
    pub fn dismiss(&mut self) {
        self.banner_visible = false;
    }

    /// Hide the banner and fire the deferred prompt.
    ///
    /// Returns None if there was no prompt to fire.
    pub async fn accept(&mut self) -> Option<InstallOutcome> {
        self.banner_visible = false;
        let prompt = self.deferred.take()?;
        let outcome = prompt.prompt().await;
        tracing::info!(outcome = ?outcome, "Install prompt answered");
        Some(outcome)
    }
}

impl std::fmt::Debug for InstallPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallPrompt")
            .field("deferred", &self.deferred.is_some())
            .field("banner_visible", &self.banner_visible)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedPrompt {
        outcome: InstallOutcome,
        shown: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DeferredInstallPrompt for ScriptedPrompt {
        async fn prompt(self: Box<Self>) -> InstallOutcome {
            self.shown.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    fn scripted(outcome: InstallOutcome, shown: &Arc<AtomicUsize>) -> Box<ScriptedPrompt> {
        Box::new(ScriptedPrompt {
            outcome,
            shown: shown.clone(),
        })
    }

    #[test]
    fn test_hidden_until_installable() {
        let mut install = InstallPrompt::new();
        assert!(!install.banner_visible());

        let shown = Arc::new(AtomicUsize::new(0));
        install.on_installable(scripted(InstallOutcome::Accepted, &shown));
        assert!(install.banner_visible());

        install.dismiss();
        assert!(!install.banner_visible());
        assert_eq!(shown.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_accept_fires_prompt_once() {
        let shown = Arc::new(AtomicUsize::new(0));
        let mut install = InstallPrompt::new();
        install.on_installable(scripted(InstallOutcome::Dismissed, &shown));

        assert_eq!(install.accept().await, Some(InstallOutcome::Dismissed));
        assert!(!install.banner_visible());
        assert_eq!(install.accept().await, None);
        assert_eq!(shown.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_accept_without_prompt() {
        let mut install = InstallPrompt::new();
        assert_eq!(install.accept().await, None);
    }
}
