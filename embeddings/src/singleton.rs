//! Process-wide embeddings service.
//!
//! The first successful request builds the service; every later request gets
//! the same `Arc`, whatever model it asks for. A failed build leaves nothing
//! installed, so the next request starts from scratch.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::EmbeddingSettings;
use crate::error::Result;
use crate::service::EmbeddingsService;

static INSTANCE: ServiceCell = ServiceCell::new();

/// Get the process-wide service, building it with the configured default
/// model on first use.
///
/// Settings are read from the environment on every attempt until one
/// succeeds, so a credential set after a failed call is picked up.
pub fn get_instance() -> Result<Arc<EmbeddingsService>> {
    INSTANCE.get_or_init_from(None, EmbeddingSettings::from_env)
}

/// Get the process-wide service, building it with `model` on first use.
///
/// `model` is ignored once the service exists.
pub fn get_instance_with_model(model: &str) -> Result<Arc<EmbeddingsService>> {
    INSTANCE.get_or_init_from(Some(model), EmbeddingSettings::from_env)
}

/// A slot holding at most one service, initialized exactly once.
///
/// Concurrent first callers block while one of them runs the initializer.
#[derive(Debug)]
pub struct ServiceCell {
    cell: OnceCell<Arc<EmbeddingsService>>,
}

impl ServiceCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the installed service, running `init` if there is none yet.
    ///
    /// If `init` fails the error is returned and the cell stays empty.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<EmbeddingsService>>
    where
        F: FnOnce() -> Result<EmbeddingsService>,
    {
        self.cell.get_or_try_init(|| init().map(Arc::new)).cloned()
    }

    /// Return the installed service, building an OpenAI-backed one from
    /// `settings` if there is none yet.
    pub fn get_or_init_with(
        &self,
        model: &str,
        settings: &EmbeddingSettings,
    ) -> Result<Arc<EmbeddingsService>> {
        self.get_or_init_from(Some(model), || settings.clone())
    }

    /// Like [`ServiceCell::get_or_init_with`], but settings come from `load`,
    /// which only runs when a build is attempted. `None` uses the model named
    /// in the loaded settings.
    pub fn get_or_init_from<L>(
        &self,
        model: Option<&str>,
        load: L,
    ) -> Result<Arc<EmbeddingsService>>
    where
        L: FnOnce() -> EmbeddingSettings,
    {
        if let Some(existing) = self.cell.get() {
            if let Some(model) = model.filter(|m| *m != existing.model()) {
                debug!(
                    "Embeddings service already initialized with model {}; ignoring {model}",
                    existing.model()
                );
            }
            return Ok(existing.clone());
        }

        self.get_or_try_init(|| {
            let settings = load();
            let model = model.unwrap_or(&settings.model);
            EmbeddingsService::from_settings(model, &settings)
        })
    }

    /// The installed service, if any.
    pub fn get(&self) -> Option<Arc<EmbeddingsService>> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for ServiceCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbeddingError;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings_with_key() -> EmbeddingSettings {
        EmbeddingSettings::default().with_api_key("sk-test")
    }

    #[test]
    fn test_same_instance_returned() {
        let cell = ServiceCell::new();
        let settings = settings_with_key();

        let first = cell.get_or_init_with("text-embedding-3-small", &settings).unwrap();
        let second = cell.get_or_init_with("text-embedding-3-small", &settings).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_first_model_wins() {
        let cell = ServiceCell::new();
        let settings = settings_with_key();

        let first = cell.get_or_init_with("text-embedding-3-small", &settings).unwrap();
        let second = cell.get_or_init_with("text-embedding-3-large", &settings).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.model(), "text-embedding-3-small");
    }

    #[test]
    fn test_missing_key_installs_nothing_and_retry_succeeds() {
        let cell = ServiceCell::new();

        let err = cell
            .get_or_init_with("text-embedding-3-small", &EmbeddingSettings::default())
            .unwrap_err();
        assert_matches!(err, EmbeddingError::Configuration(_));
        assert!(!cell.is_initialized());
        assert!(cell.get().is_none());

        cell.get_or_init_with("text-embedding-3-small", &settings_with_key()).unwrap();
        assert!(cell.is_initialized());
    }

    #[test]
    fn test_settings_reloaded_until_build_succeeds() {
        let cell = ServiceCell::new();
        let loads = AtomicUsize::new(0);
        let load = || {
            let attempt = loads.fetch_add(1, Ordering::SeqCst);
            let settings = EmbeddingSettings::default();
            if attempt == 0 {
                settings
            } else {
                settings.with_api_key("sk-later")
            }
        };

        let err = cell.get_or_init_from(None, load).unwrap_err();
        assert_matches!(err, EmbeddingError::Configuration(_));

        let service = cell.get_or_init_from(None, load).unwrap();
        assert_eq!(service.model(), "text-embedding-3-small");

        // Once built, settings are not consulted again.
        cell.get_or_init_from(Some("text-embedding-3-large"), load).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_first_callers_build_once() {
        let cell = Arc::new(ServiceCell::new());
        let builds = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                let builds = builds.clone();
                std::thread::spawn(move || {
                    cell.get_or_try_init(|| {
                        builds.fetch_add(1, Ordering::SeqCst);
                        let settings = settings_with_key();
                        EmbeddingsService::from_settings("text-embedding-3-small", &settings)
                    })
                    .unwrap()
                })
            })
            .collect();

        let services: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(services.iter().all(|s| Arc::ptr_eq(s, &services[0])));
    }
}
