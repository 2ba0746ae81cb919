//! Runtime configuration - carried as a value into the pipeline

use std::time::Duration;

/// Default 0-based indices of the pages that carry vessel metadata, the
/// BOM table and the weight summary for this document layout family.
pub const DEFAULT_KEY_PAGES: [usize; 13] = [0, 2, 3, 4, 10, 11, 15, 17, 18, 19, 20, 22, 23];

const BUDGET_MODEL: &str = "gpt-3.5-turbo";
const FULL_MODEL: &str = "gpt-4";

/// Settings for one pipeline run. Built once by the caller (CLI, desktop
/// shell, ...) and passed in; the pipeline never reads process state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Enrichment API credential; `None` disables enrichment entirely.
    pub api_key: Option<String>,
    /// Budget mode picks the cheaper completion model.
    pub budget_mode: bool,
    /// 0-based page indices to extract when the caller gives no explicit list.
    pub key_pages: Vec<usize>,
    /// Upper bound on the single outbound enrichment call.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            budget_mode: true,
            key_pages: DEFAULT_KEY_PAGES.to_vec(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Build a configuration from environment variables:
    /// `OPENAI_API_KEY`, `VESSEL_BUDGET_MODE` (default true) and
    /// `VESSEL_KEY_PAGES` (comma-separated 0-based page indices).
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let budget_mode = std::env::var("VESSEL_BUDGET_MODE")
            .ok()
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        let key_pages = std::env::var("VESSEL_KEY_PAGES")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse().ok())
                    .collect::<Vec<usize>>()
            })
            .filter(|pages| !pages.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY_PAGES.to_vec());

        Self {
            api_key,
            budget_mode,
            key_pages,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Completion model selected by the budget setting.
    pub fn model(&self) -> &'static str {
        if self.budget_mode { BUDGET_MODEL } else { FULL_MODEL }
    }
}
