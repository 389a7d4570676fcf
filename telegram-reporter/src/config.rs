// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.

use std::env;

/// Sticker posted after a successful run when no override is configured.
pub const DEFAULT_SUCCESS_STICKER_ID: &str =
    "CAACAgUAAxkBAAErjqJmTc3gMwxZ6lg6xlyvR9mBRFcBiwACBAADIBz8Eom6LgTD9Nq6NQQ";

/// Sticker posted after a failed run when no override is configured.
pub const DEFAULT_FAIL_STICKER_ID: &str =
    "CAACAgIAAxkBAAErjqBmTc3YrnVq3X41iPKf_-IByk0bMQACdQEAAonq5Qe1oIsDG4khHDUE";

/// Default cap on the number of failed tests listed in the failure block.
pub const DEFAULT_FAILED_LIMIT: usize = 10;

/// Configuration for the Telegram reporter.
///
/// All options are independent. The reporter is inert unless both a bot token
/// and a chat ID are provided; every other option has a usable default.
///
/// Options map one-to-one onto `TELEGRAM_*` environment variables read by
/// [`from_env`](Self::from_env):
///
/// | option | env var |
/// |---|---|
/// | bot token | `TELEGRAM_TOKEN` |
/// | chat ID | `TELEGRAM_CHAT_ID` |
/// | success sticker | `TELEGRAM_SUCCESS_STICKER_ID` |
/// | fail sticker | `TELEGRAM_FAIL_STICKER_ID` |
/// | disable stickers | `TELEGRAM_DISABLE_STICKERS` |
/// | report URL | `TELEGRAM_REPORT_URL` |
/// | environment label | `TELEGRAM_ENV` |
/// | list failed tests | `TELEGRAM_LIST_FAILED` |
/// | failed-list limit | `TELEGRAM_FAILED_LIMIT` |
/// | subordinate worker | `TELEGRAM_REPORT_WORKER` (presence) |
#[derive(Clone, Debug)]
pub struct ReporterConfig {
    token: Option<String>,
    chat_id: Option<String>,
    success_sticker_id: String,
    fail_sticker_id: String,
    disable_stickers: bool,
    report_url: Option<String>,
    env_label: Option<String>,
    list_failed: bool,
    failed_limit: usize,
    worker: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            success_sticker_id: DEFAULT_SUCCESS_STICKER_ID.to_owned(),
            fail_sticker_id: DEFAULT_FAIL_STICKER_ID.to_owned(),
            disable_stickers: false,
            report_url: None,
            env_label: None,
            list_failed: false,
            failed_limit: DEFAULT_FAILED_LIMIT,
            worker: false,
        }
    }
}

impl ReporterConfig {
    /// Creates a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads configuration from `TELEGRAM_*` environment variables.
    ///
    /// Unset or empty variables leave the corresponding default in place. A
    /// malformed `TELEGRAM_FAILED_LIMIT` is ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(token) = env_string("TELEGRAM_TOKEN") {
            config.set_token(token);
        }
        if let Some(chat_id) = env_string("TELEGRAM_CHAT_ID") {
            config.set_chat_id(chat_id);
        }
        if let Some(id) = env_string("TELEGRAM_SUCCESS_STICKER_ID") {
            config.set_success_sticker_id(id);
        }
        if let Some(id) = env_string("TELEGRAM_FAIL_STICKER_ID") {
            config.set_fail_sticker_id(id);
        }
        if env_flag("TELEGRAM_DISABLE_STICKERS") {
            config.set_disable_stickers(true);
        }
        if let Some(url) = env_string("TELEGRAM_REPORT_URL") {
            config.set_report_url(url);
        }
        if let Some(label) = env_string("TELEGRAM_ENV") {
            config.set_env_label(label);
        }
        if env_flag("TELEGRAM_LIST_FAILED") {
            config.set_list_failed(true);
        }
        if let Some(value) = env_string("TELEGRAM_FAILED_LIMIT") {
            match value.parse() {
                Ok(limit) => {
                    config.set_failed_limit(limit);
                }
                Err(_) => {
                    log::warn!("ignoring unparsable TELEGRAM_FAILED_LIMIT value {value:?}");
                }
            }
        }
        if env::var_os("TELEGRAM_REPORT_WORKER").is_some() {
            config.set_worker(true);
        }
        config
    }

    /// Sets the bot token.
    pub fn set_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the destination chat ID.
    pub fn set_chat_id(&mut self, chat_id: impl Into<String>) -> &mut Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Sets the sticker posted after a successful run.
    pub fn set_success_sticker_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.success_sticker_id = id.into();
        self
    }

    /// Sets the sticker posted after a failed run.
    pub fn set_fail_sticker_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.fail_sticker_id = id.into();
        self
    }

    /// Disables the status sticker entirely.
    pub fn set_disable_stickers(&mut self, disable: bool) -> &mut Self {
        self.disable_stickers = disable;
        self
    }

    /// Sets the externally hosted report URL appended to the summary.
    pub fn set_report_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.report_url = Some(url.into());
        self
    }

    /// Sets the free-text environment label shown in the summary.
    ///
    /// Escaped newlines (`\n`) are unescaped, so that multi-line labels can
    /// be passed through single-line CI variables.
    pub fn set_env_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.env_label = Some(label.into().replace("\\n", "\n"));
        self
    }

    /// Enables the failed-test detail block.
    pub fn set_list_failed(&mut self, list_failed: bool) -> &mut Self {
        self.list_failed = list_failed;
        self
    }

    /// Sets the cap on the number of failed tests listed in the detail block.
    pub fn set_failed_limit(&mut self, limit: usize) -> &mut Self {
        self.failed_limit = limit;
        self
    }

    /// Marks this process as a subordinate worker in a distributed run.
    ///
    /// Workers suppress all reporting; only the coordinator process posts the
    /// notification for the whole run.
    pub fn set_worker(&mut self, worker: bool) -> &mut Self {
        self.worker = worker;
        self
    }

    /// The bot token and chat ID, if both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.token.as_deref()?, self.chat_id.as_deref()?))
    }

    /// True if both destination credentials are present.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    /// The sticker posted after a successful run.
    pub fn success_sticker_id(&self) -> &str {
        &self.success_sticker_id
    }

    /// The sticker posted after a failed run.
    pub fn fail_sticker_id(&self) -> &str {
        &self.fail_sticker_id
    }

    /// True if the status sticker is disabled.
    pub fn disable_stickers(&self) -> bool {
        self.disable_stickers
    }

    /// The externally hosted report URL, if configured.
    pub fn report_url(&self) -> Option<&str> {
        self.report_url.as_deref()
    }

    /// The environment label, if configured.
    pub fn env_label(&self) -> Option<&str> {
        self.env_label.as_deref()
    }

    /// True if the failed-test detail block is enabled.
    pub fn list_failed(&self) -> bool {
        self.list_failed
    }

    /// The cap on the number of failed tests listed in the detail block.
    pub fn failed_limit(&self) -> usize {
        self.failed_limit
    }

    /// True if this process is a subordinate worker.
    pub fn is_worker(&self) -> bool {
        self.worker
    }

    pub(crate) fn sticker_for(&self, has_failures: bool) -> &str {
        if has_failures {
            &self.fail_sticker_id
        } else {
            &self.success_sticker_id
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_flag(name: &str) -> bool {
    env_string(name).is_some_and(|value| parse_flag(&value))
}

/// Interprets a flag-style environment value. Anything other than an explicit
/// "off" value counts as set.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        let tests: &[(&str, bool)] = &[
            ("1", true),
            ("true", true),
            ("TRUE", true),
            ("yes", true),
            ("anything", true),
            ("0", false),
            ("false", false),
            ("False", false),
            ("no", false),
            ("off", false),
        ];

        for (input, output) in tests {
            assert_eq!(parse_flag(input), *output, "for input {input:?}");
        }
    }

    #[test]
    fn env_label_unescapes_newlines() {
        let mut config = ReporterConfig::new();
        config.set_env_label("staging\\nshard 3");
        assert_eq!(config.env_label(), Some("staging\nshard 3"));
    }

    #[test]
    fn configured_requires_both_credentials() {
        let mut config = ReporterConfig::new();
        assert!(!config.is_configured());
        config.set_token("123:abc");
        assert!(!config.is_configured());
        config.set_chat_id("-100200300");
        assert!(config.is_configured());
        assert_eq!(config.credentials(), Some(("123:abc", "-100200300")));
    }

    #[test]
    fn sticker_selection() {
        let config = ReporterConfig::new();
        assert_eq!(config.sticker_for(false), DEFAULT_SUCCESS_STICKER_ID);
        assert_eq!(config.sticker_for(true), DEFAULT_FAIL_STICKER_ID);
    }
}
