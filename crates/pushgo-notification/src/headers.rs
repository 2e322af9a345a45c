use std::collections::BTreeMap;

use tracing::debug;

use crate::notification::{DEFAULT_PRIORITY, Notification};

pub const APNS_PRIORITY: &str = "apns-priority";
pub const APNS_ID: &str = "apns-id";
pub const APNS_EXPIRATION: &str = "apns-expiration";
pub const APNS_TOPIC: &str = "apns-topic";
pub const APNS_COLLAPSE_ID: &str = "apns-collapse-id";
pub const APNS_REQUEST_ID: &str = "apns-request-id";
pub const APNS_CHANNEL_ID: &str = "apns-channel-id";
pub const APNS_PUSH_TYPE: &str = "apns-push-type";

/// Header name to value, ordered by name. Numbers are rendered in decimal.
pub type Headers = BTreeMap<&'static str, String>;

impl Notification {
    /// Protocol headers for the fields that pass their inclusion rule.
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();

        if let Some(priority) = self.priority.filter(|&p| p != DEFAULT_PRIORITY) {
            headers.insert(APNS_PRIORITY, priority.to_string());
        }
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            headers.insert(APNS_ID, id.to_string());
        }
        // Negative expiry means "do not send"; zero is meaningful.
        if let Some(expiry) = self.expiry.filter(|&e| e >= 0) {
            headers.insert(APNS_EXPIRATION, expiry.to_string());
        }

        let optional = [
            (APNS_TOPIC, &self.topic),
            (APNS_COLLAPSE_ID, &self.collapse_id),
            (APNS_REQUEST_ID, &self.request_id),
            (APNS_CHANNEL_ID, &self.channel_id),
            (APNS_PUSH_TYPE, &self.push_type),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                headers.insert(name, value.clone());
            }
        }

        headers
    }

    /// Clear every header field a broadcast channel rejects.
    ///
    /// Only `request_id`, `channel_id` and `expiry` survive.
    pub fn remove_non_channel_related_properties(&mut self) {
        debug!("stripping non-channel headers from notification");
        self.priority = None;
        self.id = None;
        self.topic = None;
        self.collapse_id = None;
        self.push_type = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        assert!(Notification::new().headers().is_empty());
    }

    #[test]
    fn priority_only_when_non_default() {
        let mut note = Notification::new();
        note.priority = Some(DEFAULT_PRIORITY);
        assert!(!note.headers().contains_key(APNS_PRIORITY));

        note.priority = Some(5);
        assert_eq!(note.headers()[APNS_PRIORITY], "5");

        note.priority = Some(-1);
        assert_eq!(note.headers()[APNS_PRIORITY], "-1");
    }

    #[test]
    fn id_when_set() {
        let mut note = Notification::new();
        note.id = Some(String::new());
        assert!(!note.headers().contains_key(APNS_ID));

        note.id = Some("123e4567-e89b-12d3-a456-42665544000".to_string());
        assert_eq!(
            note.headers()[APNS_ID],
            "123e4567-e89b-12d3-a456-42665544000"
        );
    }

    #[test]
    fn expiration_follows_sign() {
        let mut note = Notification::new();

        note.expiry = Some(1000);
        assert_eq!(note.headers()[APNS_EXPIRATION], "1000");

        note.expiry = Some(0);
        assert_eq!(note.headers()[APNS_EXPIRATION], "0");

        note.expiry = Some(-1);
        assert!(!note.headers().contains_key(APNS_EXPIRATION));
    }

    #[test]
    fn string_fields_when_set() {
        let mut note = Notification::new();
        note.topic = Some("io.apn.node".to_string());
        note.collapse_id = Some("io.apn.collapse".to_string());
        note.request_id = Some("io.apn.request".to_string());
        note.channel_id = Some("io.apn.channel".to_string());
        note.push_type = Some("alert".to_string());

        let headers = note.headers();
        assert_eq!(headers[APNS_TOPIC], "io.apn.node");
        assert_eq!(headers[APNS_COLLAPSE_ID], "io.apn.collapse");
        assert_eq!(headers[APNS_REQUEST_ID], "io.apn.request");
        assert_eq!(headers[APNS_CHANNEL_ID], "io.apn.channel");
        assert_eq!(headers[APNS_PUSH_TYPE], "alert");
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn channel_headers_survive_stripping() {
        let mut note = Notification::new();
        note.priority = Some(5);
        note.id = Some("123e4567-e89b-12d3-a456-42665544000".to_string());
        note.push_type = Some("alert".to_string());
        note.expiry = Some(1000);
        note.topic = Some("io.apn.node".to_string());
        note.collapse_id = Some("io.apn.collapse".to_string());
        note.request_id = Some("io.apn.request".to_string());
        note.channel_id = Some("io.apn.channel".to_string());
        note.push_type = Some("liveactivity".to_string());

        note.remove_non_channel_related_properties();

        let expected = Headers::from([
            (APNS_CHANNEL_ID, "io.apn.channel".to_string()),
            (APNS_EXPIRATION, "1000".to_string()),
            (APNS_REQUEST_ID, "io.apn.request".to_string()),
        ]);
        assert_eq!(note.headers(), expected);
    }

    #[test]
    fn headers_do_not_touch_the_compiled_body() {
        let mut note = Notification::new();
        note.set_badge(2u32);
        let before = note.compile().unwrap().to_string();
        note.topic = Some("io.apn.node".to_string());
        let _ = note.headers();
        assert!(note.is_compiled());
        assert_eq!(note.compile().unwrap(), before);
    }
}
