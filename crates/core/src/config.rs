use serde::Deserialize;

use crate::error::ModerationResult;

/// Root moderation configuration. Loaded from environment variables
/// with the prefix `MODERATION__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModerationConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub lists: ListConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// Payload claim holding the subject id.
    #[serde(default = "default_subject_claim")]
    pub subject_claim: String,
    /// Payload claim holding the role.
    #[serde(default = "default_role_claim")]
    pub role_claim: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_company_page_size")]
    pub company_page_size: u32,
    #[serde(default = "default_marketer_page_size")]
    pub marketer_page_size: u32,
    #[serde(default = "default_withdrawal_page_size")]
    pub withdrawal_page_size: u32,
    #[serde(default = "default_withdrawal_status")]
    pub withdrawal_default_status: String,
}

// Default functions
fn default_login_path() -> String {
    "/login".to_string()
}
fn default_home_path() -> String {
    "/".to_string()
}
fn default_subject_claim() -> String {
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier".to_string()
}
fn default_role_claim() -> String {
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role".to_string()
}
fn default_company_page_size() -> u32 {
    10
}
fn default_marketer_page_size() -> u32 {
    20
}
fn default_withdrawal_page_size() -> u32 {
    20
}
fn default_withdrawal_status() -> String {
    "Pending".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            home_path: default_home_path(),
            subject_claim: default_subject_claim(),
            role_claim: default_role_claim(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            company_page_size: default_company_page_size(),
            marketer_page_size: default_marketer_page_size(),
            withdrawal_page_size: default_withdrawal_page_size(),
            withdrawal_default_status: default_withdrawal_status(),
        }
    }
}

impl ModerationConfig {
    /// Load configuration from environment variables.
    pub fn load() -> ModerationResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("MODERATION")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(
            login_path = %loaded.session.login_path,
            company_page_size = loaded.lists.company_page_size,
            "Moderation configuration loaded"
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModerationConfig::default();
        assert_eq!(config.session.login_path, "/login");
        assert_eq!(config.session.home_path, "/");
        assert!(config.session.role_claim.ends_with("/claims/role"));
        assert_eq!(config.lists.company_page_size, 10);
        assert_eq!(config.lists.withdrawal_page_size, 20);
        assert_eq!(config.lists.withdrawal_default_status, "Pending");
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: ModerationConfig =
            serde_json::from_str(r#"{"lists":{"company_page_size":25}}"#).unwrap();
        assert_eq!(config.lists.company_page_size, 25);
        assert_eq!(config.lists.marketer_page_size, 20);
        assert_eq!(config.session.home_path, "/");
    }

    #[test]
    fn test_load_reads_prefixed_environment() {
        std::env::set_var("MODERATION__LISTS__MARKETER_PAGE_SIZE", "50");
        let config = ModerationConfig::load().unwrap();
        std::env::remove_var("MODERATION__LISTS__MARKETER_PAGE_SIZE");
        assert_eq!(config.lists.marketer_page_size, 50);
        assert_eq!(config.lists.company_page_size, 10);
    }
}
