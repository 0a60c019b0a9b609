pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{DocuSignConfig, Environment, LoadMode};
pub use core::{
    auth::JwtAuthenticator,
    client::DocuSignClient,
    envelope::{build_envelope, BuildOptions},
};
pub use domain::anchor::generate_anchor;
pub use domain::model::{
    CustomField, Document, EnvelopeDraft, EnvelopeRequest, EnvelopeStatus, EnvelopeSubmission,
    Recipient, Tab,
};
pub use domain::taxonomy::{RecipientGroup, TabType};
pub use utils::encoding::{document_to_base64, read_document_base64};
pub use utils::error::{DocuSignError, Result};
