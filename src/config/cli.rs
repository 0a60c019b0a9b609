use crate::config::{DocuSignConfig, LoadMode};
use crate::core::envelope::BuildOptions;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docusign-envelopes")]
#[command(about = "Build and send DocuSign envelopes using JWT-bearer authentication")]
pub struct Cli {
    /// Path to a TOML file with a [docusign] section; DOCUSIGN_* variables are used otherwise
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a draft and print the request body without sending it
    Build(DraftArgs),
    /// Authenticate and send a draft
    Send(DraftArgs),
    /// Print the consent URL for first-time authorization
    AuthLink,
    /// Run the JWT handshake and print the account base URL
    TestConnection,
    /// Print the anchor string for a recipient's tab
    Anchor {
        #[arg(long)]
        tab_type: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        uid: String,
    },
    /// Print a file as base64 for use in documentBase64
    Encode { path: PathBuf },
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    /// JSON file with recipients, documents and customFields
    #[arg(short, long)]
    pub draft: PathBuf,

    #[arg(long)]
    pub subject: Option<String>,

    /// Keep caller-supplied recipientId values
    #[arg(long)]
    pub keep_recipient_ids: bool,

    /// Keep caller-supplied documentId values
    #[arg(long)]
    pub keep_document_ids: bool,

    /// Keep caller-supplied fieldId values
    #[arg(long)]
    pub keep_field_ids: bool,
}

impl DraftArgs {
    pub fn build_options(&self) -> BuildOptions {
        let options = BuildOptions::default()
            .assign_recipient_ids(!self.keep_recipient_ids)
            .assign_document_ids(!self.keep_document_ids)
            .assign_field_ids(!self.keep_field_ids);
        match &self.subject {
            Some(subject) => options.email_subject(subject.clone()),
            None => options,
        }
    }
}

impl Cli {
    pub fn load_config(&self, mode: LoadMode) -> Result<DocuSignConfig> {
        match &self.config {
            Some(path) => DocuSignConfig::from_file(path, mode),
            None => DocuSignConfig::from_env(mode),
        }
    }
}
