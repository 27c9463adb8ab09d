use std::path::Path;

use anyhow::{Context, Result};

use crate::logging::LogLevel;
use crate::sound::mixer::{MixerQuality, DEFAULT_MAX_SOURCES, RATE_DEFAULT};
use crate::sound::DeviceKind;

/// Environment variable overriding the configured device kind
pub const DEVICE_ENV: &str = "OAL_DEVICE";

/// How `source_set` reports native errors other than a lost context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetErrorPolicy {
    /// Log the error and report success
    #[default]
    Lenient,
    /// Return the error to the caller
    Strict,
}

/// Runtime options for the audio bindings
#[derive(Debug, Clone, PartialEq)]
pub struct OalConfig {
    pub device: DeviceKind,
    pub output_rate: u32,
    pub quality: MixerQuality,
    pub max_sources: usize,
    pub set_error_policy: SetErrorPolicy,
    /// Cap for the global `log` filter; `None` leaves it to the host
    pub log_level: Option<LogLevel>,
}

impl Default for OalConfig {
    fn default() -> Self {
        Self {
            device: DeviceKind::Default,
            output_rate: RATE_DEFAULT,
            quality: MixerQuality::Medium,
            max_sources: DEFAULT_MAX_SOURCES,
            set_error_policy: SetErrorPolicy::Lenient,
            log_level: None,
        }
    }
}

impl OalConfig {
    /// Config for headless use: null device, everything else default
    pub fn null() -> Self {
        Self {
            device: DeviceKind::Null,
            ..Self::default()
        }
    }

    /// Apply one `key = value` pair
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_ascii_lowercase().as_str() {
            "device" => self.device = parse_device(value)?,
            "output_rate" => self.output_rate = parse_rate(value)?,
            "quality" => self.quality = parse_quality(value)?,
            "max_sources" => {
                let n: usize = value.parse().context("Invalid max_sources value")?;
                if n == 0 {
                    anyhow::bail!("max_sources must be positive");
                }
                self.max_sources = n;
            }
            "set_errors" => self.set_error_policy = parse_policy(value)?,
            "log_level" => self.log_level = Some(parse_log_level(value)?),
            _ => log::warn!("Unknown config key '{}'", key),
        }
        Ok(())
    }

    /// Parse config text: one `key = value` per line, `#` starts a comment
    pub fn from_str_lines(data: &str) -> Result<Self> {
        let mut config = Self::default();
        for (lineno, raw) in data.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Key without value on line {}", lineno + 1);
                continue;
            };
            config
                .set(key.trim(), value.trim())
                .with_context(|| format!("line {}", lineno + 1))?;
        }
        Ok(config)
    }
}

/// Load configuration from `path`, or defaults when no path is given.
///
/// `OAL_DEVICE` in the environment overrides the device kind.
pub fn load_config(path: Option<&Path>) -> Result<OalConfig> {
    let mut config = match path {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            OalConfig::from_str_lines(&data)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => OalConfig::default(),
    };

    if let Ok(value) = std::env::var(DEVICE_ENV) {
        config.device = parse_device(&value).with_context(|| format!("Invalid {}", DEVICE_ENV))?;
    }

    Ok(config)
}

pub fn parse_device(s: &str) -> Result<DeviceKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "default" => Ok(DeviceKind::Default),
        "null" | "none" => Ok(DeviceKind::Null),
        other => anyhow::bail!("Unknown device '{}' (expected default or null)", other),
    }
}

/// Parse an output rate: a number of Hz or one of high/mid/low/basic
pub fn parse_rate(s: &str) -> Result<u32> {
    use crate::sound::mixer::{RATE_BASIC, RATE_HIGH, RATE_LOW, RATE_MID};

    let rate = match s.trim().to_ascii_lowercase().as_str() {
        "high" => RATE_HIGH,
        "mid" => RATE_MID,
        "low" => RATE_LOW,
        "basic" => RATE_BASIC,
        other => other.parse().context("Invalid output rate")?,
    };

    if !(RATE_BASIC..=192_000).contains(&rate) {
        anyhow::bail!("Output rate out of range (8000 to 192000)");
    }
    Ok(rate)
}

pub fn parse_quality(s: &str) -> Result<MixerQuality> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(MixerQuality::Low),
        "medium" => Ok(MixerQuality::Medium),
        "high" => Ok(MixerQuality::High),
        other => anyhow::bail!("Unknown quality '{}'", other),
    }
}

pub fn parse_policy(s: &str) -> Result<SetErrorPolicy> {
    match s.trim().to_ascii_lowercase().as_str() {
        "lenient" => Ok(SetErrorPolicy::Lenient),
        "strict" => Ok(SetErrorPolicy::Strict),
        other => anyhow::bail!("Unknown set error policy '{}'", other),
    }
}

pub fn parse_log_level(s: &str) -> Result<LogLevel> {
    match s.trim().to_ascii_lowercase().as_str() {
        "nothing" | "off" => Ok(LogLevel::Nothing),
        "error" => Ok(LogLevel::Error),
        "warning" | "warn" => Ok(LogLevel::Warning),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "all" | "trace" => Ok(LogLevel::All),
        other => anyhow::bail!("Unknown log level '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = OalConfig::default();
        assert_eq!(config.device, DeviceKind::Default);
        assert_eq!(config.output_rate, 44100);
        assert_eq!(config.quality, MixerQuality::Medium);
        assert_eq!(config.set_error_policy, SetErrorPolicy::Lenient);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("high").unwrap(), 44100);
        assert_eq!(parse_rate("MID").unwrap(), 22050);
        assert_eq!(parse_rate("low").unwrap(), 16000);
        assert_eq!(parse_rate("basic").unwrap(), 8000);
        assert_eq!(parse_rate("48000").unwrap(), 48000);
        assert!(parse_rate("4000").is_err());
        assert!(parse_rate("fast").is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(parse_device("null").unwrap(), DeviceKind::Null);
        assert!(parse_device("usb").is_err());
        assert_eq!(parse_quality("High").unwrap(), MixerQuality::High);
        assert_eq!(parse_policy("strict").unwrap(), SetErrorPolicy::Strict);
        assert_eq!(parse_log_level("warn").unwrap(), LogLevel::Warning);
    }

    #[test]
    fn test_from_str_lines() {
        let config = OalConfig::from_str_lines(
            "# audio\n\
             device = null\n\
             output_rate = mid   # lower rate\n\
             \n\
             quality=low\n\
             set_errors = strict\n\
             log_level = debug\n\
             bogus line\n\
             unknown_key = 1\n",
        )
        .unwrap();

        assert_eq!(config.device, DeviceKind::Null);
        assert_eq!(config.output_rate, 22050);
        assert_eq!(config.quality, MixerQuality::Low);
        assert_eq!(config.set_error_policy, SetErrorPolicy::Strict);
        assert_eq!(config.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_from_str_lines_reports_line() {
        let err = OalConfig::from_str_lines("device = null\nmax_sources = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    #[serial]
    fn test_load_config_file() {
        std::env::remove_var(DEVICE_ENV);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device = null").unwrap();
        writeln!(file, "max_sources = 4").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.device, DeviceKind::Null);
        assert_eq!(config.max_sources, 4);
    }

    #[test]
    #[serial]
    fn test_load_config_env_override() {
        std::env::set_var(DEVICE_ENV, "null");
        let config = load_config(None).unwrap();
        std::env::remove_var(DEVICE_ENV);
        assert_eq!(config.device, DeviceKind::Null);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Some(Path::new("/nonexistent/oal.cfg"))).is_err());
    }
}
