use crate::config::{DocuSignConfig, LoadMode, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{DocuSignError, Result};
use crate::utils::validation::validate_required_field;
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// On-disk layout:
///
/// ```toml
/// [docusign]
/// client-id = "..."
/// test-mode = true
/// impersonated-user-guid = "..."
/// private-key = "${DOCUSIGN_PRIVATE_KEY}"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub docusign: DocuSignSection,
}

/// Raw `[docusign]` table; every key optional until resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DocuSignSection {
    pub client_id: Option<String>,
    pub test_mode: Option<bool>,
    pub impersonated_user_guid: Option<String>,
    pub private_key: Option<String>,
    pub redirect_uri: Option<String>,
    pub oauth_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DocuSignError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(|e| DocuSignError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;
        config.docusign.substitute_env_vars();
        Ok(config)
    }
}

/// 替換環境變數 (例如 ${DOCUSIGN_PRIVATE_KEY})；未設定的變數保留原樣
fn substitute_env_vars(value: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

impl DocuSignSection {
    /// Runs after parsing, so substituted values (multi-line PEM keys,
    /// quotes, backslashes) never pass through TOML syntax.
    fn substitute_env_vars(&mut self) {
        let fields = [
            &mut self.client_id,
            &mut self.impersonated_user_guid,
            &mut self.private_key,
            &mut self.redirect_uri,
            &mut self.oauth_base_url,
        ];
        for value in fields.into_iter().flatten() {
            *value = substitute_env_vars(value);
        }
    }

    pub fn resolve(self, mode: LoadMode) -> Result<DocuSignConfig> {
        let client_id = validate_required_field("client-id", &self.client_id)?.clone();
        let test_mode = *validate_required_field("test-mode", &self.test_mode)?;

        if mode == LoadMode::Full {
            validate_required_field("impersonated-user-guid", &self.impersonated_user_guid)?;
            validate_required_field("private-key", &self.private_key)?;
        }

        Ok(DocuSignConfig {
            client_id,
            test_mode,
            impersonated_user_id: self.impersonated_user_guid,
            private_key: self.private_key.map(SecretString::from),
            redirect_uri: self.redirect_uri,
            oauth_base_url: self.oauth_base_url,
            timeout_seconds: self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        })
    }
}
