//! Preferences store
//!
//! Same dispatch/subscribe shape as the note store, over the single
//! [`UserPreferences`] record. Listeners always receive the full record.

use tracing::debug;

use super::listeners::{Listeners, SubscriptionId};
use crate::models::{CaptureMode, Theme, UserPreferences};

/// A mutation of the preferences record
#[derive(Debug, Clone, PartialEq)]
pub enum PreferencesAction {
    SetTheme(Theme),
    SetFontSize(u32),
    SetAnimationsEnabled(bool),
    SetReducedMotion(bool),
    SetDefaultCaptureMode(CaptureMode),
    SetLocationTrackingEnabled(bool),
    SetVoiceInputEnabled(bool),
    SetAutoSave(bool),
    /// Replace the whole record (startup load)
    SetUserPreferences(UserPreferences),
}

/// Holder of the process-wide preferences record
pub struct PreferencesStore {
    preferences: UserPreferences,
    listeners: Listeners<UserPreferences, ()>,
}

impl Default for PreferencesStore {
    fn default() -> Self {
        Self::new(UserPreferences::default())
    }
}

impl PreferencesStore {
    pub fn new(preferences: UserPreferences) -> Self {
        Self {
            preferences,
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&UserPreferences) + Send + 'static,
    {
        self.listeners.add(Box::new(move |prefs, ()| listener(prefs)))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Apply an action. Returns true if the record changed.
    pub fn dispatch(&mut self, action: PreferencesAction) -> bool {
        let mut next = self.preferences.clone();
        match action {
            PreferencesAction::SetTheme(v) => next.theme = v,
            PreferencesAction::SetFontSize(v) => next.font_size = v,
            PreferencesAction::SetAnimationsEnabled(v) => next.animations_enabled = v,
            PreferencesAction::SetReducedMotion(v) => next.reduced_motion = v,
            PreferencesAction::SetDefaultCaptureMode(v) => next.default_capture_mode = v,
            PreferencesAction::SetLocationTrackingEnabled(v) => next.location_tracking_enabled = v,
            PreferencesAction::SetVoiceInputEnabled(v) => next.voice_input_enabled = v,
            PreferencesAction::SetAutoSave(v) => next.auto_save = v,
            PreferencesAction::SetUserPreferences(all) => next = all,
        }

        if next == self.preferences {
            return false;
        }
        self.preferences = next;
        debug!("Preferences changed: {:?}", self.preferences);
        self.listeners.notify(&self.preferences, ());
        true
    }

    pub fn get(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.dispatch(PreferencesAction::SetTheme(theme))
    }

    pub fn set_font_size(&mut self, size: u32) -> bool {
        self.dispatch(PreferencesAction::SetFontSize(size))
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) -> bool {
        self.dispatch(PreferencesAction::SetAnimationsEnabled(enabled))
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) -> bool {
        self.dispatch(PreferencesAction::SetReducedMotion(reduced))
    }

    pub fn set_default_capture_mode(&mut self, mode: CaptureMode) -> bool {
        self.dispatch(PreferencesAction::SetDefaultCaptureMode(mode))
    }

    pub fn set_location_tracking_enabled(&mut self, enabled: bool) -> bool {
        self.dispatch(PreferencesAction::SetLocationTrackingEnabled(enabled))
    }

    pub fn set_voice_input_enabled(&mut self, enabled: bool) -> bool {
        self.dispatch(PreferencesAction::SetVoiceInputEnabled(enabled))
    }

    pub fn set_auto_save(&mut self, enabled: bool) -> bool {
        self.dispatch(PreferencesAction::SetAutoSave(enabled))
    }

    pub fn set_user_preferences(&mut self, preferences: UserPreferences) -> bool {
        self.dispatch(PreferencesAction::SetUserPreferences(preferences))
    }
}
