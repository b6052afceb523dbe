use serde::{Deserialize, Serialize};

use super::defaults;

/// Static application identity stamped onto every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Application name.
    pub app: String,
    /// Application version string.
    pub app_version: String,
    /// Build identifier.
    pub build: String,
    /// Deployment environment: "dev", "staging", "prod".
    pub env: String,
    /// Platform label.
    pub platform: String,
    /// Locale override. Falls back to `LANG`, then the default.
    pub locale: Option<String>,
    /// Timezone override. Falls back to `TZ`, then the default.
    pub timezone: Option<String>,
    /// External referrer used when no in-app referrer is known.
    pub document_referrer: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app: defaults::DEFAULT_APP.to_string(),
            app_version: defaults::DEFAULT_APP_VERSION.to_string(),
            build: defaults::DEFAULT_BUILD.to_string(),
            env: defaults::default_env().to_string(),
            platform: defaults::DEFAULT_PLATFORM.to_string(),
            locale: None,
            timezone: None,
            document_referrer: None,
        }
    }
}

impl ClientConfig {
    /// Effective locale.
    pub fn resolved_locale(&self) -> String {
        self.locale
            .clone()
            .or_else(|| std::env::var("LANG").ok().and_then(|l| locale_from_lang(&l)))
            .unwrap_or_else(|| defaults::DEFAULT_LOCALE.to_string())
    }

    /// Effective timezone.
    pub fn resolved_timezone(&self) -> String {
        self.timezone
            .clone()
            .or_else(|| std::env::var("TZ").ok().filter(|tz| !tz.is_empty()))
            .unwrap_or_else(|| defaults::DEFAULT_TIMEZONE.to_string())
    }
}

/// `en_US.UTF-8` -> `en-US`. `C` and `POSIX` carry no locale.
fn locale_from_lang(lang: &str) -> Option<String> {
    let tag = lang.split('.').next().unwrap_or_default();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}
