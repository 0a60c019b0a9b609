pub mod auth;
pub mod client;
pub mod envelope;

pub use crate::domain::model::{
    AccountSession, CustomField, Document, EnvelopeDraft, EnvelopeRequest, EnvelopeSubmission,
    Recipient, Tab,
};
pub use crate::domain::ports::Authenticator;
pub use crate::utils::error::Result;
