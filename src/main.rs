use clap::Parser;
use docusign_envelopes::config::cli::{Cli, Command, DraftArgs, LogFormat};
use docusign_envelopes::utils::error::ErrorSeverity;
use docusign_envelopes::utils::logger;
use docusign_envelopes::{
    generate_anchor, read_document_base64, DocuSignClient, DocuSignError, EnvelopeDraft, LoadMode,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::debug!("CLI arguments: {:?}", cli);

    if let Err(e) = run(&cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<(), DocuSignError> {
    match &cli.command {
        Command::Build(args) => {
            let draft = read_draft(args)?;
            let request = draft.build(&args.build_options())?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Send(args) => {
            let draft = read_draft(args)?;
            let client = client(cli, LoadMode::Full)?;
            let submission = client.send_draft(&draft, &args.build_options()).await?;
            tracing::info!("✅ Envelope accepted with status {}", submission.status_code);
            println!("{}", serde_json::to_string_pretty(&submission.response)?);
        }
        Command::AuthLink => {
            let client = client(cli, LoadMode::AuthOnly)?;
            println!("{}", client.authorization_link()?);
        }
        Command::TestConnection => {
            let client = client(cli, LoadMode::Full)?;
            println!("{}", client.test_connection().await?);
        }
        Command::Anchor {
            tab_type,
            email,
            uid,
        } => {
            println!("{}", generate_anchor(tab_type, email, uid)?);
        }
        Command::Encode { path } => {
            println!("{}", read_document_base64(path)?);
        }
    }
    Ok(())
}

fn client(cli: &Cli, mode: LoadMode) -> Result<DocuSignClient, DocuSignError> {
    let config = cli.load_config(mode)?;
    tracing::info!(
        "Using DocuSign {:?} environment via {}",
        config.environment(),
        config.auth_base()
    );
    DocuSignClient::new(config)
}

fn read_draft(args: &DraftArgs) -> Result<EnvelopeDraft, DocuSignError> {
    tracing::debug!("Reading envelope draft from: {}", args.draft.display());
    let content = std::fs::read_to_string(&args.draft)?;
    Ok(serde_json::from_str(&content)?)
}
