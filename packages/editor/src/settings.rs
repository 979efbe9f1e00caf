//! Named key/value settings.

use std::collections::HashMap;

/// Settings key holding the name recorded as the author of changes
pub const USER_NAME_KEY: &str = "application/user-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsScope {
    Application,
    Project,
}

pub trait SettingsStore: Send {
    fn value(&self, key: &str, scope: SettingsScope) -> Option<String>;

    fn set_value(&mut self, key: &str, value: String, scope: SettingsScope);
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    values: HashMap<(SettingsScope, String), String>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings with the application user name already set
    pub fn with_user(name: impl Into<String>) -> Self {
        let mut settings = Self::new();
        settings.set_value(USER_NAME_KEY, name.into(), SettingsScope::Application);
        settings
    }
}

impl SettingsStore for InMemorySettings {
    fn value(&self, key: &str, scope: SettingsScope) -> Option<String> {
        self.values.get(&(scope, key.to_string())).cloned()
    }

    fn set_value(&mut self, key: &str, value: String, scope: SettingsScope) {
        self.values.insert((scope, key.to_string()), value);
    }
}
