//! Configuration for the trend-watch pipeline
//!
//! [`WatchConfig`] is read from environment variables (after `.env` has been
//! applied). [`WatchConfig::from_lookup`] accepts any key lookup so the same
//! parsing can run against a fixed map in tests.

use crate::error::{Result, WatchError};
use chartwatch_llm::RetryPolicy;
use chartwatch_utils::parse_bool;
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Settings for one hosted model
#[derive(Clone, Default)]
pub struct ProviderSettings {
    /// Whether the provider takes part in chart analysis
    pub enabled: bool,

    /// API key
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Override for the provider's API base URL
    pub api_base: Option<String>,
}

impl ProviderSettings {
    fn disabled(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }

    /// Whether the provider can actually be called
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// All provider settings
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub perplexity: ProviderSettings,
    pub claude: ProviderSettings,
    /// Gemini; `enabled` covers chart analysis only
    pub google: ProviderSettings,
    /// Use Gemini to consolidate the other providers' analyses
    pub google_consolidation: bool,
    pub grok: ProviderSettings,
    pub openai: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            perplexity: ProviderSettings::disabled("sonar-pro"),
            claude: ProviderSettings::disabled("claude-sonnet-4-5-20250929"),
            google: ProviderSettings::disabled("gemini-3-pro-preview"),
            google_consolidation: false,
            grok: ProviderSettings::disabled("grok-2"),
            openai: ProviderSettings::disabled("gpt-4o"),
        }
    }
}

/// SMTP settings for alert emails
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub to: Option<String>,
}

impl EmailConfig {
    /// Whether user, password and recipient are all set
    pub fn is_configured(&self) -> bool {
        self.user.is_some() && self.password.is_some() && self.to.is_some()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            user: None,
            password: None,
            to: None,
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("to", &self.to)
            .finish()
    }
}

/// Market-hours schedule
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub timezone: Tz,
    pub start: NaiveTime,
    pub stop: NaiveTime,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(3600),
            timezone: chrono_tz::US::Eastern,
            start: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            stop: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        }
    }
}

/// Where screenshots are found and which chart slots are expected
#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    /// Root directory; each symbol has its own sub-folder
    pub dir: PathBuf,
    pub tradingview_enabled: bool,
    pub symbolik_enabled: bool,
    /// File name patterns for the four TradingView tabs (`{symbol}` is substituted)
    pub tab_names: [String; 4],
    /// File name pattern for the Symbolik workspace
    pub symbolik_name: String,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("screenshots"),
            tradingview_enabled: true,
            symbolik_enabled: true,
            tab_names: [1, 2, 3, 4].map(|n| format!("{{symbol}}_tab{n}.png")),
            symbolik_name: "{symbol}_symbolik.png".to_string(),
        }
    }
}

/// Request and retry settings shared by every provider call
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
}

impl RequestConfig {
    /// Retry policy for provider calls: exponential backoff from the base
    /// delay, capped at one minute, plus up to one second of jitter
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            self.retry_base_delay,
            Duration::from_secs(60),
            2.0,
        )
        .with_jitter(Duration::from_secs(1))
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.2,
            timeout_secs: 120,
            retry_max_attempts: 5,
            retry_base_delay: Duration::from_millis(1000),
        }
    }
}

/// Configuration for the trend-watch pipeline
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub providers: ProvidersConfig,

    /// Trend change probability (percent) at or above which a provider flags a change
    pub email_threshold: f64,

    pub email: EmailConfig,
    pub schedule: ScheduleConfig,
    pub screenshots: ScreenshotConfig,
    pub request: RequestConfig,

    /// File with one symbol per line
    pub symbols_file: PathBuf,

    /// Comma-separated symbols used when the file is missing
    pub symbols_fallback: String,

    /// Directory with prompt template overrides
    pub prompts_dir: Option<PathBuf>,

    pub log_file: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            email_threshold: 60.0,
            email: EmailConfig::default(),
            schedule: ScheduleConfig::default(),
            screenshots: ScreenshotConfig::default(),
            request: RequestConfig::default(),
            symbols_file: PathBuf::from("stock_symbols.txt"),
            symbols_fallback: "QBTS".to_string(),
            prompts_dir: None,
            log_file: PathBuf::from("chartwatch.log"),
        }
    }
}

impl WatchConfig {
    /// Create a new configuration builder
    pub fn builder() -> WatchConfigBuilder {
        WatchConfigBuilder::default()
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);
        let defaults = Self::default();

        let providers = ProvidersConfig {
            perplexity: env.provider(
                "Perplexity",
                "PERPLEXITY_ENABLED",
                &["PERPLEXITY_API_KEY"],
                "PERPLEXITY_MODEL",
                None,
                &defaults.providers.perplexity.model,
            ),
            claude: env.provider(
                "Claude",
                "CLAUDE_ENABLED",
                &["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"],
                "CLAUDE_MODEL",
                None,
                &defaults.providers.claude.model,
            ),
            google: env.provider(
                "Google AI",
                "GOOGLE_AI_CHART_ENABLED",
                &["GOOGLE_AI_API_KEY"],
                "GOOGLE_AI_MODEL",
                None,
                &defaults.providers.google.model,
            ),
            google_consolidation: {
                let wanted = env.flag("GOOGLE_AI_CONSOLIDATION_ENABLED", false);
                if wanted && env.get("GOOGLE_AI_API_KEY").is_none() {
                    warn!("Google AI consolidation enabled but GOOGLE_AI_API_KEY is missing; disabling");
                    false
                } else {
                    wanted
                }
            },
            grok: env.provider(
                "Grok",
                "GROK_ENABLED",
                &["GROK_API_KEY"],
                "GROK_MODEL",
                None,
                &defaults.providers.grok.model,
            ),
            openai: env.provider(
                "OpenAI",
                "OPENAI_ENABLED",
                &["OPENAI_API_KEY"],
                "OPENAI_MODEL",
                Some("OPENAI_API_BASE"),
                &defaults.providers.openai.model,
            ),
        };

        let email = EmailConfig {
            smtp_server: env
                .get("SMTP_SERVER")
                .unwrap_or(defaults.email.smtp_server),
            smtp_port: env.parsed("SMTP_PORT", defaults.email.smtp_port)?,
            user: env.get("EMAIL_USER"),
            password: env.get("EMAIL_PASSWORD"),
            to: env.get("EMAIL_TO"),
        };

        let schedule = ScheduleConfig {
            enabled: env.flag("SCHEDULE_ENABLED", defaults.schedule.enabled),
            interval: Duration::from_secs(
                env.parsed("CAPTURE_INTERVAL_SECONDS", defaults.schedule.interval.as_secs())?,
            ),
            timezone: match env.get("CAPTURE_TIMEZONE") {
                Some(name) => parse_timezone(&name)?,
                None => defaults.schedule.timezone,
            },
            start: env.time("CAPTURE_START_TIME", defaults.schedule.start)?,
            stop: env.time("CAPTURE_STOP_TIME", defaults.schedule.stop)?,
        };

        let tab_names = [1, 2, 3, 4].map(|n| {
            env.get(&format!("SCREENSHOT_NAME_TAB{n}"))
                .unwrap_or_else(|| defaults.screenshots.tab_names[n - 1].clone())
        });
        let screenshots = ScreenshotConfig {
            dir: env
                .get("SCREENSHOT_DIR")
                .map_or(defaults.screenshots.dir, PathBuf::from),
            tradingview_enabled: env.flag("TRADINGVIEW_ENABLED", true),
            symbolik_enabled: env.flag("SYMBOLIK_ENABLED", true),
            tab_names,
            symbolik_name: env
                .get("SCREENSHOT_NAME_SYMBOLIK")
                .unwrap_or(defaults.screenshots.symbolik_name),
        };

        let request = RequestConfig {
            max_tokens: env.parsed("LLM_MAX_TOKENS", defaults.request.max_tokens)?,
            temperature: env.parsed("LLM_TEMPERATURE", defaults.request.temperature)?,
            timeout_secs: env.parsed("LLM_TIMEOUT_SECS", defaults.request.timeout_secs)?,
            retry_max_attempts: env.parsed("RETRY_MAX_ATTEMPTS", defaults.request.retry_max_attempts)?,
            retry_base_delay: Duration::from_millis(env.parsed(
                "RETRY_BASE_DELAY_MS",
                u64::try_from(defaults.request.retry_base_delay.as_millis()).unwrap_or(1000),
            )?),
        };

        let config = Self {
            providers,
            email_threshold: env.parsed("EMAIL_ALERT_THRESHOLD", defaults.email_threshold)?,
            email,
            schedule,
            screenshots,
            request,
            symbols_file: env
                .get("STOCK_SYMBOLS_FILE")
                .map_or(defaults.symbols_file, PathBuf::from),
            symbols_fallback: env.get("STOCK_SYMBOLS").unwrap_or(defaults.symbols_fallback),
            prompts_dir: env.get("PROMPTS_DIR").map(PathBuf::from),
            log_file: env.get("LOG_FILE").map_or(defaults.log_file, PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.email_threshold) {
            return Err(WatchError::config(format!(
                "EMAIL_ALERT_THRESHOLD must be between 0 and 100, got {}",
                self.email_threshold
            )));
        }

        if self.request.retry_max_attempts == 0 {
            return Err(WatchError::config(
                "RETRY_MAX_ATTEMPTS must be greater than 0",
            ));
        }

        if self.schedule.start > self.schedule.stop {
            return Err(WatchError::config(format!(
                "CAPTURE_START_TIME {} is after CAPTURE_STOP_TIME {}",
                self.schedule.start, self.schedule.stop
            )));
        }

        if self.schedule.enabled && self.schedule.interval.is_zero() {
            return Err(WatchError::config(
                "CAPTURE_INTERVAL_SECONDS must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Key/value view of the effective configuration with secrets masked
    pub fn display_rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        let providers = [
            ("perplexity", &self.providers.perplexity),
            ("claude", &self.providers.claude),
            ("google", &self.providers.google),
            ("grok", &self.providers.grok),
            ("openai", &self.providers.openai),
        ];
        for (name, settings) in providers {
            rows.push((
                format!("{name}.enabled"),
                settings.enabled.to_string(),
            ));
            rows.push((format!("{name}.model"), settings.model.clone()));
            rows.push((format!("{name}.api_key"), mask(settings.api_key.as_deref())));
            if let Some(base) = &settings.api_base {
                rows.push((format!("{name}.api_base"), base.clone()));
            }
        }
        rows.push((
            "google.consolidation".into(),
            self.providers.google_consolidation.to_string(),
        ));

        rows.push(("email.threshold".into(), format!("{}%", self.email_threshold)));
        rows.push((
            "email.smtp".into(),
            format!("{}:{}", self.email.smtp_server, self.email.smtp_port),
        ));
        rows.push((
            "email.user".into(),
            self.email.user.clone().unwrap_or_else(|| "-".into()),
        ));
        rows.push(("email.password".into(), mask(self.email.password.as_deref())));
        rows.push((
            "email.to".into(),
            self.email.to.clone().unwrap_or_else(|| "-".into()),
        ));

        rows.push(("schedule.enabled".into(), self.schedule.enabled.to_string()));
        rows.push((
            "schedule.interval".into(),
            format!("{}s", self.schedule.interval.as_secs()),
        ));
        rows.push((
            "schedule.window".into(),
            format!(
                "{}-{} {}",
                self.schedule.start.format("%H:%M"),
                self.schedule.stop.format("%H:%M"),
                self.schedule.timezone.name()
            ),
        ));

        rows.push((
            "screenshots.dir".into(),
            self.screenshots.dir.display().to_string(),
        ));
        rows.push((
            "screenshots.tradingview".into(),
            self.screenshots.tradingview_enabled.to_string(),
        ));
        rows.push((
            "screenshots.symbolik".into(),
            self.screenshots.symbolik_enabled.to_string(),
        ));

        rows.push((
            "request.max_tokens".into(),
            self.request.max_tokens.to_string(),
        ));
        rows.push((
            "request.temperature".into(),
            self.request.temperature.to_string(),
        ));
        rows.push((
            "request.timeout".into(),
            format!("{}s", self.request.timeout_secs),
        ));
        rows.push((
            "retry.max_attempts".into(),
            self.request.retry_max_attempts.to_string(),
        ));
        rows.push((
            "retry.base_delay".into(),
            format!("{}ms", self.request.retry_base_delay.as_millis()),
        ));

        rows.push(("symbols.file".into(), self.symbols_file.display().to_string()));
        rows.push(("symbols.fallback".into(), self.symbols_fallback.clone()));
        rows.push((
            "prompts.dir".into(),
            self.prompts_dir
                .as_ref()
                .map_or_else(|| "-".into(), |p| p.display().to_string()),
        ));
        rows.push(("log.file".into(), self.log_file.display().to_string()));
        rows
    }
}

fn mask(secret: Option<&str>) -> String {
    match secret {
        Some(_) => "[REDACTED]".to_string(),
        None => "-".to_string(),
    }
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| WatchError::config(format!("Invalid CAPTURE_TIMEZONE '{name}': {e}")))
}

/// Key lookup with typed accessors
struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |v| parse_bool(&v))
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T>
    where
        T::Err: fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| WatchError::config(format!("Invalid {key} '{raw}': {e}"))),
            None => Ok(default),
        }
    }

    fn time(&self, key: &str, default: NaiveTime) -> Result<NaiveTime> {
        match self.get(key) {
            Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|e| WatchError::config(format!("Invalid {key} '{raw}': {e}"))),
            None => Ok(default),
        }
    }

    fn provider(
        &self,
        label: &str,
        enabled_key: &str,
        key_names: &[&str],
        model_key: &str,
        base_key: Option<&str>,
        default_model: &str,
    ) -> ProviderSettings {
        let api_key = key_names.iter().find_map(|k| self.get(k));
        let mut enabled = self.flag(enabled_key, false);
        if enabled && api_key.is_none() {
            warn!(
                "{} enabled but {} is not set; disabling",
                label, key_names[0]
            );
            enabled = false;
        }

        ProviderSettings {
            enabled,
            api_key,
            model: self
                .get(model_key)
                .unwrap_or_else(|| default_model.to_string()),
            api_base: base_key.and_then(|k| self.get(k)),
        }
    }
}

/// Builder for WatchConfig
#[derive(Debug, Default)]
pub struct WatchConfigBuilder {
    providers: Option<ProvidersConfig>,
    email_threshold: Option<f64>,
    email: Option<EmailConfig>,
    schedule: Option<ScheduleConfig>,
    screenshot_dir: Option<PathBuf>,
    request: Option<RequestConfig>,
    prompts_dir: Option<PathBuf>,
}

impl WatchConfigBuilder {
    /// Set provider settings
    pub fn providers(mut self, providers: ProvidersConfig) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Set the alert threshold in percent
    pub fn email_threshold(mut self, threshold: f64) -> Self {
        self.email_threshold = Some(threshold);
        self
    }

    /// Set SMTP settings
    pub fn email(mut self, email: EmailConfig) -> Self {
        self.email = Some(email);
        self
    }

    /// Set the schedule
    pub fn schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Set the screenshot root directory
    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    /// Set request and retry settings
    pub fn request(mut self, request: RequestConfig) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the prompt override directory
    pub fn prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<WatchConfig> {
        let defaults = WatchConfig::default();

        let mut screenshots = defaults.screenshots;
        if let Some(dir) = self.screenshot_dir {
            screenshots.dir = dir;
        }

        let config = WatchConfig {
            providers: self.providers.unwrap_or(defaults.providers),
            email_threshold: self.email_threshold.unwrap_or(defaults.email_threshold),
            email: self.email.unwrap_or(defaults.email),
            schedule: self.schedule.unwrap_or(defaults.schedule),
            screenshots,
            request: self.request.unwrap_or(defaults.request),
            prompts_dir: self.prompts_dir.or(defaults.prompts_dir),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<WatchConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        WatchConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!((config.email_threshold - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.email.smtp_server, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 587);
        assert!(!config.schedule.enabled);
        assert_eq!(config.schedule.interval, Duration::from_secs(3600));
        assert_eq!(config.schedule.timezone, chrono_tz::US::Eastern);
        assert_eq!(config.screenshots.dir, PathBuf::from("screenshots"));
        assert_eq!(config.screenshots.tab_names[0], "{symbol}_tab1.png");
        assert_eq!(config.request.max_tokens, 4000);
        assert_eq!(config.request.retry_max_attempts, 5);
        assert_eq!(config.symbols_fallback, "QBTS");
        assert_eq!(config.providers.perplexity.model, "sonar-pro");
        assert!(!config.providers.claude.enabled);
    }

    #[test]
    fn test_provider_enabled_with_key() {
        let config = load(&[
            ("CLAUDE_ENABLED", "yes"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("CLAUDE_MODEL", "claude-opus"),
        ])
        .unwrap();

        assert!(config.providers.claude.is_usable());
        assert_eq!(config.providers.claude.model, "claude-opus");
    }

    #[test]
    fn test_provider_enabled_without_key_is_disabled() {
        let config = load(&[("PERPLEXITY_ENABLED", "true"), ("PERPLEXITY_API_KEY", "  ")]).unwrap();
        assert!(!config.providers.perplexity.enabled);
    }

    #[test]
    fn test_openai_api_base() {
        let config = load(&[
            ("OPENAI_ENABLED", "1"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:1234/v1"),
        ])
        .unwrap();
        assert_eq!(
            config.providers.openai.api_base.as_deref(),
            Some("http://localhost:1234/v1")
        );
    }

    #[test]
    fn test_consolidation_requires_key() {
        let config = load(&[("GOOGLE_AI_CONSOLIDATION_ENABLED", "true")]).unwrap();
        assert!(!config.providers.google_consolidation);

        let config = load(&[
            ("GOOGLE_AI_CONSOLIDATION_ENABLED", "true"),
            ("GOOGLE_AI_API_KEY", "AIza-test"),
        ])
        .unwrap();
        assert!(config.providers.google_consolidation);
        assert!(!config.providers.google.enabled);
    }

    #[test]
    fn test_schedule_parsing() {
        let config = load(&[
            ("SCHEDULE_ENABLED", "true"),
            ("CAPTURE_INTERVAL_SECONDS", "900"),
            ("CAPTURE_TIMEZONE", "Europe/London"),
            ("CAPTURE_START_TIME", "08:00"),
            ("CAPTURE_STOP_TIME", "16:30"),
        ])
        .unwrap();

        assert!(config.schedule.enabled);
        assert_eq!(config.schedule.interval, Duration::from_secs(900));
        assert_eq!(config.schedule.timezone, chrono_tz::Europe::London);
        assert_eq!(config.schedule.stop, NaiveTime::from_hms_opt(16, 30, 0).unwrap());
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(matches!(
            load(&[("SMTP_PORT", "abc")]),
            Err(WatchError::Config(_))
        ));
        assert!(load(&[("CAPTURE_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(load(&[("CAPTURE_START_TIME", "9am")]).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(load(&[("EMAIL_ALERT_THRESHOLD", "101")]).is_err());
        assert!(load(&[("RETRY_MAX_ATTEMPTS", "0")]).is_err());
        assert!(load(&[
            ("CAPTURE_START_TIME", "17:00"),
            ("CAPTURE_STOP_TIME", "09:00"),
        ])
        .is_err());
    }

    #[test]
    fn test_retry_policy() {
        let config = load(&[("RETRY_MAX_ATTEMPTS", "3"), ("RETRY_BASE_DELAY_MS", "250")]).unwrap();
        let policy = config.request.retry_policy();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(250));
        assert_eq!(policy.max_backoff, Duration::from_secs(60));
        assert_eq!(policy.jitter, Duration::from_secs(1));
    }

    #[test]
    fn test_builder() {
        let config = WatchConfig::builder()
            .email_threshold(75.0)
            .screenshot_dir("/tmp/shots")
            .build()
            .unwrap();

        assert!((config.email_threshold - 75.0).abs() < f64::EPSILON);
        assert_eq!(config.screenshots.dir, PathBuf::from("/tmp/shots"));

        assert!(WatchConfig::builder().email_threshold(150.0).build().is_err());
    }

    #[test]
    fn test_display_rows_redact_secrets() {
        let config = load(&[
            ("GROK_ENABLED", "true"),
            ("GROK_API_KEY", "xai-secret"),
            ("EMAIL_PASSWORD", "hunter2"),
        ])
        .unwrap();

        let rows = config.display_rows();
        assert!(rows.iter().all(|(_, v)| !v.contains("xai-secret")));
        assert!(rows.iter().all(|(_, v)| v != "hunter2"));
        assert!(rows.contains(&("grok.api_key".to_string(), "[REDACTED]".to_string())));
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
