use std::env;
use std::path::PathBuf;
use std::time::Duration;

use partilha_core::{AppError, AppResult};
use partilha_domain::DEFAULT_PAGE_SIZE;
use url::Url;

use crate::admin_command::Resource;

const API_BASE_URL: &str = "PARTILHA_API_BASE_URL";
const SERVICE_KEY: &str = "PARTILHA_SERVICE_KEY";
const SESSION_FILE: &str = "PARTILHA_SESSION_FILE";
const HTTP_TIMEOUT_SECS: &str = "PARTILHA_HTTP_TIMEOUT_SECS";
const PAGE_SIZE: &str = "PARTILHA_PAGE_SIZE";
const FEATURE_CAMPAIGNS: &str = "PARTILHA_FEATURE_CAMPAIGNS";
const FEATURE_EXTERNAL_STORES: &str = "PARTILHA_FEATURE_EXTERNAL_STORES";

const DEFAULT_SESSION_FILE: &str = ".partilha/session.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Optional feature sections of the backoffice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub campaigns: bool,
    pub external_stores: bool,
}

impl FeatureFlags {
    pub fn allows(self, resource: Resource) -> bool {
        match resource {
            Resource::Campaigns => self.campaigns,
            Resource::StoresExternal => self.external_stores,
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub api_base_url: Url,
    pub service_key: String,
    pub session_file: PathBuf,
    pub http_timeout: Duration,
    pub page_size: u32,
    pub features: FeatureFlags,
}

impl AdminConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<&str> = [API_BASE_URL, SERVICE_KEY]
            .into_iter()
            .filter(|name| value(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let raw_base_url = value(API_BASE_URL).unwrap_or_default();
        let api_base_url = Url::parse(raw_base_url.trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!("invalid {API_BASE_URL} value '{raw_base_url}': {error}"))
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "{API_BASE_URL} must be a hierarchical URL, got '{raw_base_url}'"
            )));
        }

        let service_key = value(SERVICE_KEY).unwrap_or_default();
        let session_file = value(SESSION_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
        let http_timeout_secs = parse_positive(value(HTTP_TIMEOUT_SECS), HTTP_TIMEOUT_SECS)?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        let page_size = parse_positive(value(PAGE_SIZE), PAGE_SIZE)?
            .map(|page_size| u32::try_from(page_size).unwrap_or(u32::MAX))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let flag = |name: &str| value(name).is_some_and(|value| value.eq_ignore_ascii_case("true"));

        Ok(Self {
            api_base_url,
            service_key,
            session_file,
            http_timeout: Duration::from_secs(http_timeout_secs),
            page_size,
            features: FeatureFlags {
                campaigns: flag(FEATURE_CAMPAIGNS),
                external_stores: flag(FEATURE_EXTERNAL_STORES),
            },
        })
    }
}

fn parse_positive(value: Option<String>, name: &str) -> AppResult<Option<u64>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let parsed = value
        .parse::<u64>()
        .map_err(|error| AppError::Validation(format!("invalid {name} value '{value}': {error}")))?;
    if parsed == 0 {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(Some(parsed))
}
