//! Theme preference persistence.

use crate::model::preference::ThemePreference;
use crate::repo::task_repo::RepoResult;
use crate::storage::kv::KeyValueStore;
use log::warn;

/// Key holding the theme preference string.
pub const THEME_KEY: &str = "theme";

/// Loads and saves host display preferences.
pub struct PreferenceRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PreferenceRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the saved theme, or `None` when unset or unrecognized so the
    /// host can fall back to the platform setting.
    pub fn load_theme(&self) -> Option<ThemePreference> {
        match self.store.get(THEME_KEY) {
            Ok(value) => value.as_deref().and_then(ThemePreference::parse),
            Err(err) => {
                warn!(
                    "event=theme_load module=repo status=recovered reason=read_failed error={}",
                    err
                );
                None
            }
        }
    }

    pub fn save_theme(&self, theme: ThemePreference) -> RepoResult<()> {
        self.store.set(THEME_KEY, theme.as_str())?;
        Ok(())
    }
}
