use std::path::Path;

use serde::Deserialize;

use crate::{Error, notification::Notification};

/// Header defaults shared by every notification a sender builds.
///
/// ```toml
/// topic = "io.ethan.pushgo"
/// priority = 5
/// expiry = 0
/// push_type = "alert"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationDefaults {
    pub topic: Option<String>,
    pub priority: Option<i32>,
    pub expiry: Option<i64>,
    pub push_type: Option<String>,
}

impl NotificationDefaults {
    pub fn from_toml_str(raw: &str) -> Result<Self, Error> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Fill the fields `note` has not set itself.
    pub fn apply(&self, note: &mut Notification) {
        note.topic = note.topic.take().or_else(|| self.topic.clone());
        note.priority = note.priority.or(self.priority);
        note.expiry = note.expiry.or(self.expiry);
        note.push_type = note.push_type.take().or_else(|| self.push_type.clone());
    }
}
