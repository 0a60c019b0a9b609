//! Fixed registries of tab types and recipient roles accepted by the
//! envelopes endpoint.

use crate::utils::error::{DocuSignError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-type data: anchor abbreviation and whether the sender may set the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSpec {
    pub abbreviation: &'static str,
    pub settable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabType {
    Approve,
    Checkbox,
    Company,
    DateSigned,
    Date,
    Decline,
    Email,
    EnvelopeId,
    FirstName,
    FormulaTab,
    FullName,
    InitialHere,
    LastName,
    List,
    Notarize,
    Note,
    Number,
    RadioGroup,
    SignHere,
    SignerAttachment,
    Ssn,
    Text,
    Title,
    View,
    Zip,
}

impl TabType {
    pub const ALL: [TabType; 25] = [
        TabType::Approve,
        TabType::Checkbox,
        TabType::Company,
        TabType::DateSigned,
        TabType::Date,
        TabType::Decline,
        TabType::Email,
        TabType::EnvelopeId,
        TabType::FirstName,
        TabType::FormulaTab,
        TabType::FullName,
        TabType::InitialHere,
        TabType::LastName,
        TabType::List,
        TabType::Notarize,
        TabType::Note,
        TabType::Number,
        TabType::RadioGroup,
        TabType::SignHere,
        TabType::SignerAttachment,
        TabType::Ssn,
        TabType::Text,
        TabType::Title,
        TabType::View,
        TabType::Zip,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TabType::Approve => "approve",
            TabType::Checkbox => "checkbox",
            TabType::Company => "company",
            TabType::DateSigned => "dateSigned",
            TabType::Date => "date",
            TabType::Decline => "decline",
            TabType::Email => "email",
            TabType::EnvelopeId => "envelopeId",
            TabType::FirstName => "firstName",
            TabType::FormulaTab => "formulaTab",
            TabType::FullName => "fullName",
            TabType::InitialHere => "initialHere",
            TabType::LastName => "lastName",
            TabType::List => "list",
            TabType::Notarize => "notarize",
            TabType::Note => "note",
            TabType::Number => "number",
            TabType::RadioGroup => "radioGroup",
            TabType::SignHere => "signHere",
            TabType::SignerAttachment => "signerAttachment",
            TabType::Ssn => "ssn",
            TabType::Text => "text",
            TabType::Title => "title",
            TabType::View => "view",
            TabType::Zip => "zip",
        }
    }

    pub fn spec(self) -> TabSpec {
        let (abbreviation, settable) = match self {
            TabType::Approve => ("appro", false),
            TabType::Checkbox => ("check", true),
            TabType::Company => ("compa", false),
            TabType::DateSigned => ("dates", false),
            TabType::Date => ("datex", true),
            TabType::Decline => ("decli", false),
            TabType::Email => ("email", true),
            TabType::EnvelopeId => ("envel", false),
            TabType::FirstName => ("first", false),
            TabType::FormulaTab => ("formu", true),
            TabType::FullName => ("fulln", false),
            TabType::InitialHere => ("initi", false),
            TabType::LastName => ("lastn", false),
            TabType::List => ("list", true),
            TabType::Notarize => ("notar", true),
            TabType::Note => ("note", true),
            TabType::Number => ("numbe", true),
            TabType::RadioGroup => ("radio", true),
            TabType::SignHere => ("signh", false),
            TabType::SignerAttachment => ("signe", false),
            TabType::Ssn => ("ssn", true),
            TabType::Text => ("text", true),
            TabType::Title => ("title", false),
            TabType::View => ("view", true),
            TabType::Zip => ("zip", true),
        };
        TabSpec {
            abbreviation,
            settable,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        self.spec().abbreviation
    }

    pub fn is_settable(self) -> bool {
        self.spec().settable
    }

    /// Plural key the tab is grouped under, e.g. `signHereTabs`.
    pub fn bucket_name(self) -> String {
        format!("{}Tabs", self.as_str())
    }

    pub fn lookup(tab_type: &str) -> Result<TabType> {
        TabType::ALL
            .into_iter()
            .find(|t| t.as_str() == tab_type)
            .ok_or_else(|| DocuSignError::UnknownTabType {
                tab_type: tab_type.to_string(),
            })
    }
}

impl FromStr for TabType {
    type Err = DocuSignError;

    fn from_str(s: &str) -> Result<Self> {
        TabType::lookup(s)
    }
}

impl fmt::Display for TabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient role buckets of the `recipients` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecipientGroup {
    Agents,
    CarbonCopies,
    CertifiedDeliveries,
    Editors,
    InPersonSigners,
    Intermediaries,
    Seals,
    Signers,
}

impl RecipientGroup {
    pub const ALL: [RecipientGroup; 8] = [
        RecipientGroup::Agents,
        RecipientGroup::CarbonCopies,
        RecipientGroup::CertifiedDeliveries,
        RecipientGroup::Editors,
        RecipientGroup::InPersonSigners,
        RecipientGroup::Intermediaries,
        RecipientGroup::Seals,
        RecipientGroup::Signers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecipientGroup::Agents => "agents",
            RecipientGroup::CarbonCopies => "carbonCopies",
            RecipientGroup::CertifiedDeliveries => "certifiedDeliveries",
            RecipientGroup::Editors => "editors",
            RecipientGroup::InPersonSigners => "inPersonSigners",
            RecipientGroup::Intermediaries => "intermediaries",
            RecipientGroup::Seals => "seals",
            RecipientGroup::Signers => "signers",
        }
    }

    pub fn lookup(group: &str) -> Option<RecipientGroup> {
        RecipientGroup::ALL.into_iter().find(|g| g.as_str() == group)
    }
}

impl fmt::Display for RecipientGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
