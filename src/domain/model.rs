use crate::domain::taxonomy::{RecipientGroup, TabType};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Caller input
// ---------------------------------------------------------------------------

/// A tab as supplied by the caller: a `type` plus any DocuSign tab properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tab_type: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Tab {
    pub fn new(tab_type: TabType) -> Self {
        Self {
            tab_type: Some(tab_type.as_str().to_string()),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn anchored(self, anchor: impl Into<String>) -> Self {
        self.with_field("anchorString", anchor.into())
    }

    pub fn locked(self, locked: bool) -> Self {
        self.with_field("locked", locked)
    }

    pub fn original_value(self, value: impl Into<Value>) -> Self {
        self.with_field("originalValue", value)
    }

    pub(crate) fn controls_value(&self) -> bool {
        self.fields.contains_key("locked") || self.fields.contains_key("originalValue")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Vec<Tab>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recipient {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        routing_order: u32,
        group: RecipientGroup,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            routing_order: Some(routing_order),
            group: Some(group.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn with_recipient_id(mut self, recipient_id: u32) -> Self {
        self.recipient_id = Some(recipient_id);
        self
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tabs.get_or_insert_with(Vec::new).push(tab);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        file_extension: impl Into<String>,
        document_base64: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            file_extension: Some(file_extension.into()),
            document_base64: Some(document_base64.into()),
            ..Default::default()
        }
    }

    pub fn from_bytes(
        name: impl Into<String>,
        file_extension: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self::new(
            name,
            file_extension,
            crate::utils::encoding::document_to_base64(bytes),
        )
    }

    pub fn with_document_id(mut self, document_id: u32) -> Self {
        self.document_id = Some(document_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::of_kind("text", name, value)
    }

    pub fn list(name: impl Into<String>, value: impl Into<String>, items: Vec<String>) -> Self {
        Self::of_kind("list", name, value).with_field("listItems", items)
    }

    fn of_kind(kind: &str, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_type: Some(kind.to_string()),
            ..Default::default()
        }
        .with_field("name", name.into())
        .with_field("value", value.into())
    }

    pub fn with_field_id(mut self, field_id: u32) -> Self {
        self.field_id = Some(field_id);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Everything needed to build one envelope, e.g. as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDraft {
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire output
// ---------------------------------------------------------------------------

/// Insertion-ordered grouping; serializes as a JSON object whose keys appear
/// in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets<K, V> {
    entries: Vec<(K, Vec<V>)>,
}

impl<K: PartialEq, V> Buckets<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: K, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: PartialEq, V> Default for Buckets<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Buckets<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Tab properties with the `type` key stripped.
pub type TabFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Sent,
    Created,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeRecipient {
    pub name: String,
    pub email: String,
    pub routing_order: u32,
    pub recipient_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Buckets<String, TabFields>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocument {
    pub name: String,
    pub file_extension: String,
    pub document_base64: String,
    pub document_id: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeCustomField {
    pub field_id: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeCustomFields {
    pub list_custom_fields: Vec<EnvelopeCustomField>,
    pub text_custom_fields: Vec<EnvelopeCustomField>,
}

/// Request body for `POST {accountBase}/envelopes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeRequest {
    pub status: EnvelopeStatus,
    pub email_subject: String,
    pub recipients: Buckets<RecipientGroup, EnvelopeRecipient>,
    pub documents: Vec<EnvelopeDocument>,
    pub envelope_custom_fields: EnvelopeCustomFields,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct EnvelopeSubmission {
    pub request: EnvelopeRequest,
    pub response: Value,
    pub status_code: u16,
}

// ---------------------------------------------------------------------------
// Handshake states
// ---------------------------------------------------------------------------

/// Bearer token obtained from the JWT grant.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

/// Token plus the account it resolved to; the end state of the handshake.
#[derive(Debug, Clone)]
pub struct AccountSession {
    pub access_token: AccessToken,
    pub account_id: String,
    pub base_uri: String,
}

impl AccountSession {
    /// `{base_uri}/restapi/v2/accounts/{account_id}`
    pub fn account_base_url(&self) -> String {
        format!(
            "{}/restapi/v2/accounts/{}",
            self.base_uri.trim_end_matches('/'),
            self.account_id
        )
    }
}
