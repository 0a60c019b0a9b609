use crate::domain::model::{
    Buckets, CustomField, Document, EnvelopeCustomField, EnvelopeCustomFields, EnvelopeDocument,
    EnvelopeDraft, EnvelopeRecipient, EnvelopeRequest, EnvelopeStatus, Recipient, Tab, TabFields,
};
use crate::domain::taxonomy::{RecipientGroup, TabType};
use crate::utils::error::{DocuSignError, Result};
use crate::utils::validation::is_valid_email;

pub const DEFAULT_EMAIL_SUBJECT: &str = "Please Sign";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub send_immediately: bool,
    /// `None` sends [`DEFAULT_EMAIL_SUBJECT`] unless a draft supplies one.
    pub email_subject: Option<String>,
    pub assign_document_ids: bool,
    pub assign_recipient_ids: bool,
    pub assign_field_ids: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            send_immediately: false,
            email_subject: None,
            assign_document_ids: true,
            assign_recipient_ids: true,
            assign_field_ids: true,
        }
    }
}

impl BuildOptions {
    pub fn send_immediately(mut self, send: bool) -> Self {
        self.send_immediately = send;
        self
    }

    pub fn email_subject(mut self, subject: impl Into<String>) -> Self {
        self.email_subject = Some(subject.into());
        self
    }

    pub fn assign_document_ids(mut self, assign: bool) -> Self {
        self.assign_document_ids = assign;
        self
    }

    pub fn assign_recipient_ids(mut self, assign: bool) -> Self {
        self.assign_recipient_ids = assign;
        self
    }

    pub fn assign_field_ids(mut self, assign: bool) -> Self {
        self.assign_field_ids = assign;
        self
    }
}

/// Validates the caller's records and produces the envelopes request body.
///
/// Inputs are left untouched; the output is built fresh. Fails on the first
/// invalid record, before any network activity.
pub fn build_envelope(
    recipients: &[Recipient],
    documents: &[Document],
    custom_fields: &[CustomField],
    options: &BuildOptions,
) -> Result<EnvelopeRequest> {
    let mut grouped: Buckets<RecipientGroup, EnvelopeRecipient> = Buckets::new();
    for (index, recipient) in recipients.iter().enumerate() {
        let (group, recipient) = transform_recipient(index, recipient, options)?;
        grouped.push(group, recipient);
    }

    let documents = documents
        .iter()
        .enumerate()
        .map(|(index, document)| transform_document(index, document, options))
        .collect::<Result<Vec<_>>>()?;

    let envelope_custom_fields = route_custom_fields(custom_fields, options)?;

    let status = if options.send_immediately {
        EnvelopeStatus::Sent
    } else {
        EnvelopeStatus::Created
    };

    tracing::debug!(
        "Built envelope: {} recipient group(s), {} document(s), status {:?}",
        grouped.len(),
        documents.len(),
        status
    );

    Ok(EnvelopeRequest {
        status,
        email_subject: options
            .email_subject
            .clone()
            .unwrap_or_else(|| DEFAULT_EMAIL_SUBJECT.to_string()),
        recipients: grouped,
        documents,
        envelope_custom_fields,
    })
}

impl EnvelopeDraft {
    /// Builds with `options`; the draft's subject is used when the options
    /// leave the subject unset.
    pub fn build(&self, options: &BuildOptions) -> Result<EnvelopeRequest> {
        match (&self.email_subject, &options.email_subject) {
            (Some(subject), None) => {
                let options = options.clone().email_subject(subject.clone());
                build_envelope(&self.recipients, &self.documents, &self.custom_fields, &options)
            }
            _ => build_envelope(&self.recipients, &self.documents, &self.custom_fields, options),
        }
    }
}

fn required<'a, T>(
    value: &'a Option<T>,
    record: &'static str,
    index: usize,
    field: &'static str,
) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or(DocuSignError::MissingField {
            record,
            index,
            field,
        })
}

fn transform_recipient(
    index: usize,
    recipient: &Recipient,
    options: &BuildOptions,
) -> Result<(RecipientGroup, EnvelopeRecipient)> {
    const RECORD: &str = "recipient";

    let name = required(&recipient.name, RECORD, index, "name")?;
    let email = required(&recipient.email, RECORD, index, "email")?;
    let routing_order = *required(&recipient.routing_order, RECORD, index, "routingOrder")?;
    let group = required(&recipient.group, RECORD, index, "group")?;

    if !is_valid_email(email) {
        return Err(DocuSignError::InvalidEmail {
            index,
            email: email.clone(),
        });
    }

    let recipient_id = if options.assign_recipient_ids {
        index as u32 + 1
    } else {
        *required(&recipient.recipient_id, RECORD, index, "recipientId")?
    };

    let tabs = recipient.tabs.as_deref().map(group_tabs).transpose()?;

    let group = RecipientGroup::lookup(group).ok_or_else(|| DocuSignError::UnknownRecipientGroup {
        index,
        group: group.clone(),
    })?;

    Ok((
        group,
        EnvelopeRecipient {
            name: name.clone(),
            email: email.clone(),
            routing_order,
            recipient_id,
            tabs,
            extra: recipient.extra.clone(),
        },
    ))
}

/// Regroups a recipient's tabs into `<type>Tabs` buckets.
fn group_tabs(tabs: &[Tab]) -> Result<Buckets<String, TabFields>> {
    let mut buckets = Buckets::new();
    for (index, tab) in tabs.iter().enumerate() {
        let tab_type = TabType::lookup(required(&tab.tab_type, "tab", index, "type")?)?;
        if !tab_type.is_settable() && tab.controls_value() {
            return Err(DocuSignError::ValueNotControllable {
                tab_type: tab_type.to_string(),
            });
        }
        buckets.push(tab_type.bucket_name(), tab.fields.clone());
    }
    Ok(buckets)
}

fn transform_document(
    index: usize,
    document: &Document,
    options: &BuildOptions,
) -> Result<EnvelopeDocument> {
    const RECORD: &str = "document";

    let name = required(&document.name, RECORD, index, "name")?;
    let file_extension = required(&document.file_extension, RECORD, index, "fileExtension")?;
    let document_base64 = required(&document.document_base64, RECORD, index, "documentBase64")?;
    let document_id = if options.assign_document_ids {
        index as u32 + 1
    } else {
        *required(&document.document_id, RECORD, index, "documentId")?
    };

    Ok(EnvelopeDocument {
        name: name.clone(),
        file_extension: file_extension.clone(),
        document_base64: document_base64.clone(),
        document_id,
        extra: document.extra.clone(),
    })
}

fn route_custom_fields(
    custom_fields: &[CustomField],
    options: &BuildOptions,
) -> Result<EnvelopeCustomFields> {
    const RECORD: &str = "custom field";

    let mut routed = EnvelopeCustomFields::default();
    for (index, field) in custom_fields.iter().enumerate() {
        let field_id = if options.assign_field_ids {
            index as u32 + 1
        } else {
            *required(&field.field_id, RECORD, index, "fieldId")?
        };
        let out = EnvelopeCustomField {
            field_id,
            extra: field.extra.clone(),
        };
        match required(&field.field_type, RECORD, index, "type")?.as_str() {
            "list" => routed.list_custom_fields.push(out),
            "text" => routed.text_custom_fields.push(out),
            other => {
                return Err(DocuSignError::InvalidCustomFieldType {
                    index,
                    field_type: other.to_string(),
                })
            }
        }
    }
    Ok(routed)
}
