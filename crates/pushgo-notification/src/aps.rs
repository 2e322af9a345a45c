use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `aps` dictionary assembled from accessor writes.
///
/// Every key is optional and only reaches the wire once it has been set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Aps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<Sound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_available: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutable_content: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interruption_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissal_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

impl Aps {
    /// True when no accessor has written a key.
    pub fn is_empty(&self) -> bool {
        *self == Aps::default()
    }

    /// Serialize the set keys into a JSON object.
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Replace the alert body, keeping a plain-text alert plain.
    pub(crate) fn set_alert_body(&mut self, body: String) {
        match &mut self.alert {
            Some(Alert::Dictionary(dict)) => dict.body = Some(body),
            _ => self.alert = Some(Alert::Text(body)),
        }
    }

    /// Edit the alert as a dictionary. A plain-text alert becomes its body.
    pub(crate) fn update_alert(&mut self, edit: impl FnOnce(&mut AlertDictionary)) {
        let mut dict = match self.alert.take() {
            Some(Alert::Dictionary(dict)) => dict,
            Some(Alert::Text(body)) => AlertDictionary {
                body: Some(body),
                ..AlertDictionary::default()
            },
            None => AlertDictionary::default(),
        };
        edit(&mut dict);
        self.alert = Some(Alert::Dictionary(dict));
    }
}

/// Alert content shown to the user, either plain text or a dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alert {
    Text(String),
    Dictionary(AlertDictionary),
}

impl From<&str> for Alert {
    fn from(text: &str) -> Self {
        Alert::Text(text.to_string())
    }
}

impl From<String> for Alert {
    fn from(text: String) -> Self {
        Alert::Text(text)
    }
}

impl From<AlertDictionary> for Alert {
    fn from(dict: AlertDictionary) -> Self {
        Alert::Dictionary(dict)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlertDictionary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc_args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_loc_args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_loc_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_image: Option<String>,
    /// Alert keys without a typed field, passed through as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sound configuration (name or detailed settings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sound {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        critical: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f32>,
    },
}

impl Sound {
    /// A critical alert sound; out-of-range volumes are clamped.
    pub fn critical(name: impl Into<String>, volume: f32) -> Self {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Sound::Detailed {
            name: name.into(),
            critical: Some(1),
            volume: Some(volume),
        }
    }
}

impl From<&str> for Sound {
    fn from(name: &str) -> Self {
        Sound::Name(name.to_string())
    }
}

impl From<String> for Sound {
    fn from(name: String) -> Self {
        Sound::Name(name)
    }
}
