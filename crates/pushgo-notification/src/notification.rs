use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    Error,
    aps::{Alert, AlertDictionary, Aps, Sound},
};

/// Priority APNs assumes when no `apns-priority` header is sent.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Payload key inspected by [`Notification::add_push_type_to_payload_if_needed`].
pub const PUSH_TYPE_KEY: &str = "push-type";

pub const LIVE_ACTIVITY_PUSH_TYPE: &str = "liveactivity";

/// A single outbound APNs message.
///
/// The body is compiled lazily and memoized: once [`compile`](Self::compile)
/// has run, later calls return the cached JSON until [`invalidate`](Self::invalidate)
/// is called, whatever has been mutated in between.
#[derive(Debug, Clone, Default)]
pub struct Notification {
    /// Application data; the `aps` dictionary is merged in at compile time.
    pub payload: Map<String, Value>,
    /// Full override of the compiled body. Wins over everything else.
    pub raw_payload: Option<Map<String, Value>>,
    /// MDM magic string; when set the body is `{"mdm": ...}`.
    pub mdm: Option<String>,
    pub aps: Aps,

    pub priority: Option<i32>,
    pub id: Option<String>,
    /// Seconds since the epoch. Negative values are not sent.
    pub expiry: Option<i64>,
    pub topic: Option<String>,
    pub collapse_id: Option<String>,
    pub request_id: Option<String>,
    pub channel_id: Option<String>,
    pub push_type: Option<String>,

    compiled: bool,
    compiled_json: String,
}

macro_rules! aps_setters {
    ($($(#[$doc:meta])* $setter:ident => $field:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $setter(&mut self, value: impl Into<$ty>) -> &mut Self {
                self.aps.$field = Some(value.into());
                self
            }
        )*
    };
}

macro_rules! alert_setters {
    ($($setter:ident => $field:ident: $ty:ty;)*) => {
        $(
            pub fn $setter(&mut self, value: impl Into<$ty>) -> &mut Self {
                let value = value.into();
                self.aps.update_alert(|alert| alert.$field = Some(value));
                self
            }
        )*
    };
}

impl Notification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a notification from a JSON object of camelCase properties.
    ///
    /// Recognised keys go through the same setters as direct mutation, so
    /// `{"badge": 5}` lands in `aps.badge`. Unknown keys are ignored.
    pub fn from_properties(properties: Value) -> Result<Self, Error> {
        let properties: Properties =
            serde_json::from_value(properties).map_err(Error::InvalidProperties)?;
        let mut note = Self::new();
        properties.apply(&mut note);
        Ok(note)
    }

    /// The value [`compile`](Self::compile) serializes.
    pub fn to_json(&self) -> Result<Value, Error> {
        if let Some(raw) = &self.raw_payload {
            debug!("raw payload set, skipping aps synthesis");
            return Ok(Value::Object(raw.clone()));
        }
        if let Some(mdm) = &self.mdm {
            return Ok(json!({ "mdm": mdm }));
        }

        let mut body = self.payload.clone();
        if !self.aps.is_empty() {
            let fields = self.aps.to_map()?;
            if let Some(Value::Object(existing)) = body.get_mut("aps") {
                existing.extend(fields);
            } else {
                body.insert("aps".to_string(), Value::Object(fields));
            }
        }
        Ok(Value::Object(body))
    }

    /// Serialized body, computed at most once per compiled epoch.
    pub fn compile(&mut self) -> Result<&str, Error> {
        if self.compiled {
            trace!("serving memoized notification body");
        } else {
            let json = serde_json::to_string(&self.to_json()?)?;
            debug!(bytes = json.len(), "compiled notification body");
            self.compiled_json = json;
            self.compiled = true;
        }
        Ok(self.compiled_json.as_str())
    }

    /// Byte length of the compiled body.
    pub fn length(&mut self) -> Result<usize, Error> {
        Ok(self.compile()?.len())
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Drop the memoized body so the next `compile` reflects current state.
    pub fn invalidate(&mut self) {
        self.compiled = false;
    }

    /// Effective priority, falling back to [`DEFAULT_PRIORITY`].
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    /// Assign a random `apns-id` unless one is already set.
    pub fn generate_id(&mut self) -> &str {
        if self.id.as_deref().is_none_or(str::is_empty) {
            self.id = Some(Uuid::new_v4().to_string());
        }
        self.id.as_deref().unwrap_or_default()
    }

    pub fn set_expiry_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.expiry = Some(at.timestamp());
        self
    }

    /// Live Activity updates need `push-type` in the body; default it.
    pub fn add_push_type_to_payload_if_needed(&mut self) {
        if self.raw_payload.is_some() {
            debug!("raw payload set, leaving push-type untouched");
            return;
        }
        match self.payload.get(PUSH_TYPE_KEY) {
            Some(value) if !value.is_null() => {}
            _ => {
                self.payload
                    .insert(PUSH_TYPE_KEY.to_string(), Value::from(LIVE_ACTIVITY_PUSH_TYPE));
            }
        }
    }

    pub fn set_mdm(&mut self, magic: impl Into<String>) -> &mut Self {
        self.mdm = Some(magic.into());
        self
    }

    pub fn set_alert(&mut self, alert: impl Into<Alert>) -> &mut Self {
        self.aps.alert = Some(alert.into());
        self
    }

    /// Plain-text alerts stay plain; dictionaries only get their body replaced.
    pub fn set_alert_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.aps.set_alert_body(body.into());
        self
    }

    alert_setters! {
        set_title => title: String;
        set_subtitle => subtitle: String;
        set_loc_key => loc_key: String;
        set_loc_args => loc_args: Vec<String>;
        set_title_loc_key => title_loc_key: String;
        set_title_loc_args => title_loc_args: Vec<String>;
        set_action => action: String;
        set_action_loc_key => action_loc_key: String;
        set_launch_image => launch_image: String;
    }

    aps_setters! {
        set_badge => badge: u32;
        set_sound => sound: Sound;
        set_category => category: String;
        set_thread_id => thread_id: String;
        /// Safari `url-args`.
        set_url_args => url_args: Vec<String>;
        set_interruption_level => interruption_level: String;
        set_relevance_score => relevance_score: f64;
        set_target_content_id => target_content_id: String;
        set_timestamp => timestamp: i64;
        set_event => event: String;
        set_content_state => content_state: Value;
        set_stale_date => stale_date: i64;
        set_dismissal_date => dismissal_date: i64;
        set_attributes_type => attributes_type: String;
        set_attributes => attributes: Value;
    }

    /// `true` sends `content-available: 1`; `false` removes the key.
    pub fn set_content_available(&mut self, enabled: bool) -> &mut Self {
        self.aps.content_available = enabled.then_some(1);
        self
    }

    /// `true` sends `mutable-content: 1`; `false` removes the key.
    pub fn set_mutable_content(&mut self, enabled: bool) -> &mut Self {
        self.aps.mutable_content = enabled.then_some(1);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Properties {
    priority: Option<i32>,
    id: Option<String>,
    expiry: Option<i64>,
    topic: Option<String>,
    collapse_id: Option<String>,
    request_id: Option<String>,
    channel_id: Option<String>,
    push_type: Option<String>,

    payload: Option<Map<String, Value>>,
    raw_payload: Option<Map<String, Value>>,
    mdm: Option<String>,

    alert: Option<Alert>,
    #[serde(alias = "alertBody")]
    body: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    loc_key: Option<String>,
    loc_args: Option<Vec<String>>,
    title_loc_key: Option<String>,
    title_loc_args: Option<Vec<String>>,
    action: Option<String>,
    action_loc_key: Option<String>,
    launch_image: Option<String>,

    badge: Option<u32>,
    sound: Option<Sound>,
    content_available: Option<bool>,
    mutable_content: Option<bool>,
    category: Option<String>,
    thread_id: Option<String>,
    url_args: Option<Vec<String>>,
    interruption_level: Option<String>,
    relevance_score: Option<f64>,
    #[serde(alias = "targetContentIdentifier")]
    target_content_id: Option<String>,
    timestamp: Option<i64>,
    event: Option<String>,
    content_state: Option<Value>,
    stale_date: Option<i64>,
    dismissal_date: Option<i64>,
    attributes_type: Option<String>,
    attributes: Option<Value>,
}

impl Properties {
    fn apply(self, note: &mut Notification) {
        note.priority = self.priority;
        note.id = self.id;
        note.expiry = self.expiry;
        note.topic = self.topic;
        note.collapse_id = self.collapse_id;
        note.request_id = self.request_id;
        note.channel_id = self.channel_id;
        note.push_type = self.push_type;

        if let Some(payload) = self.payload {
            note.payload = payload;
        }
        note.raw_payload = self.raw_payload;
        note.mdm = self.mdm;

        // The alert itself goes first so dictionary fields refine it.
        note.aps.alert = self.alert;
        if let Some(body) = self.body {
            note.aps.set_alert_body(body);
        }
        let dictionary = AlertDictionary {
            title: self.title,
            subtitle: self.subtitle,
            body: None,
            loc_key: self.loc_key,
            loc_args: self.loc_args,
            title_loc_key: self.title_loc_key,
            title_loc_args: self.title_loc_args,
            action: self.action,
            action_loc_key: self.action_loc_key,
            launch_image: self.launch_image,
            extra: Map::new(),
        };
        if dictionary != AlertDictionary::default() {
            note.aps.update_alert(|alert| merge_alert_fields(alert, dictionary));
        }

        note.aps.badge = self.badge;
        note.aps.sound = self.sound;
        if let Some(enabled) = self.content_available {
            note.set_content_available(enabled);
        }
        if let Some(enabled) = self.mutable_content {
            note.set_mutable_content(enabled);
        }
        note.aps.category = self.category;
        note.aps.thread_id = self.thread_id;
        note.aps.url_args = self.url_args;
        note.aps.interruption_level = self.interruption_level;
        note.aps.relevance_score = self.relevance_score;
        note.aps.target_content_id = self.target_content_id;
        note.aps.timestamp = self.timestamp;
        note.aps.event = self.event;
        note.aps.content_state = self.content_state;
        note.aps.stale_date = self.stale_date;
        note.aps.dismissal_date = self.dismissal_date;
        note.aps.attributes_type = self.attributes_type;
        note.aps.attributes = self.attributes;
    }
}

fn merge_alert_fields(alert: &mut AlertDictionary, fields: AlertDictionary) {
    let AlertDictionary {
        title,
        subtitle,
        body: _,
        loc_key,
        loc_args,
        title_loc_key,
        title_loc_args,
        action,
        action_loc_key,
        launch_image,
        extra,
    } = fields;
    alert.title = title.or(alert.title.take());
    alert.subtitle = subtitle.or(alert.subtitle.take());
    alert.loc_key = loc_key.or(alert.loc_key.take());
    alert.loc_args = loc_args.or(alert.loc_args.take());
    alert.title_loc_key = title_loc_key.or(alert.title_loc_key.take());
    alert.title_loc_args = title_loc_args.or(alert.title_loc_args.take());
    alert.action = action.or(alert.action.take());
    alert.action_loc_key = action_loc_key.or(alert.action_loc_key.take());
    alert.launch_image = launch_image.or(alert.launch_image.take());
    alert.extra.extend(extra);
}
