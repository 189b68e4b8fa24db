//! Identity and preferences persistence.
//!
//! Both documents live under their own storage key and outlive transcript
//! clears. Missing or unreadable documents fall back to defaults.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::identity::SessionIdentity;
use crate::domain::preferences::{FontSize, Preferences, Theme, WindowSize};
use crate::ports::storage::{KeyValueStore, keys};

/// Errors from identity updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Display name cannot be blank")]
    BlankDisplayName,

    #[error("Avatar reference cannot be blank")]
    BlankAvatar,
}

#[derive(Debug, Clone, Default)]
struct Profile {
    identity: SessionIdentity,
    preferences: Preferences,
}

/// Owns the session identity and display preferences.
pub struct ProfileService {
    profile: Mutex<Profile>,
    storage: Arc<dyn KeyValueStore>,
}

impl ProfileService {
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let profile = Profile {
            identity: load(storage.as_ref(), keys::IDENTITY),
            preferences: load(storage.as_ref(), keys::PREFERENCES),
        };
        tracing::debug!(
            display_name = %profile.identity.display_name,
            theme = profile.preferences.theme.id(),
            "Profile loaded"
        );
        Self {
            profile: Mutex::new(profile),
            storage,
        }
    }

    pub fn identity(&self) -> SessionIdentity {
        self.lock().identity.clone()
    }

    /// Change the display name. Surrounding whitespace is trimmed; a blank
    /// name is rejected and the identity is left unchanged.
    pub fn rename(&self, name: &str) -> Result<SessionIdentity, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::BlankDisplayName);
        }
        let mut profile = self.lock();
        profile.identity.display_name = name.to_string();
        self.save(keys::IDENTITY, &profile.identity);
        tracing::info!(display_name = %name, "Display name changed");
        Ok(profile.identity.clone())
    }

    pub fn set_avatar(&self, avatar: &str) -> Result<SessionIdentity, ProfileError> {
        let avatar = avatar.trim();
        if avatar.is_empty() {
            return Err(ProfileError::BlankAvatar);
        }
        let mut profile = self.lock();
        profile.identity.avatar_ref = avatar.to_string();
        self.save(keys::IDENTITY, &profile.identity);
        tracing::info!(avatar, "Avatar changed");
        Ok(profile.identity.clone())
    }

    pub fn preferences(&self) -> Preferences {
        self.lock().preferences
    }

    pub fn set_theme(&self, theme: Theme) -> Preferences {
        self.update_preferences(|p| p.theme = theme)
    }

    pub fn set_font_size(&self, font_size: FontSize) -> Preferences {
        self.update_preferences(|p| p.font_size = font_size)
    }

    pub fn set_window_size(&self, window_size: WindowSize) -> Preferences {
        self.update_preferences(|p| p.window_size = window_size)
    }

    fn update_preferences(&self, apply: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut profile = self.lock();
        apply(&mut profile.preferences);
        self.save(keys::PREFERENCES, &profile.preferences);
        tracing::debug!(preferences = ?profile.preferences, "Preferences changed");
        profile.preferences
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = self.storage.set(key, &json) {
                    tracing::warn!(key, error = %e, "Failed to persist profile");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize profile"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Profile> {
        self.profile
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn load<T: DeserializeOwned + Default>(storage: &dyn KeyValueStore, key: &str) -> T {
    match storage.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Discarding corrupt profile document");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read profile document");
            T::default()
        }
    }
}
