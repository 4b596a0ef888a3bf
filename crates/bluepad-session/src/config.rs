//! Session configuration.
//!
//! Every value is re-read through [`ConfigSource::current`] on each tick and
//! each rumble request, so live edits through [`SharedConfig`] take effect
//! without restarting the session.

use std::sync::Arc;

use bluepad_hid_ds4_protocol::UpdateRate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Default light bar intensity.
pub const DEFAULT_LIGHTBAR_BRIGHTNESS: u8 = 64;

/// Feedback and report-rate settings for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Force light bar and flash bytes to zero.
    pub lightbar_disabled: bool,
    /// Force both motor bytes to zero regardless of requests.
    pub rumble_disabled: bool,
    /// Intensity of the player color's channel(s).
    pub lightbar_brightness: u8,
    /// Input report rate written at session start.
    pub update_rate: UpdateRate,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lightbar_disabled: false,
            rumble_disabled: false,
            lightbar_brightness: DEFAULT_LIGHTBAR_BRIGHTNESS,
            update_rate: UpdateRate::default(),
        }
    }
}

impl SessionConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the light bar is enabled with zero brightness.
    pub fn validate(&self) -> SessionResult<()> {
        if !self.lightbar_disabled && self.lightbar_brightness == 0 {
            return Err(SessionError::invalid_config(
                "lightbar_brightness must be greater than 0 (set lightbar_disabled instead)",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConfigParse`] for malformed JSON and
    /// [`SessionError::InvalidConfig`] if validation fails.
    pub fn from_json(text: &str) -> SessionResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| SessionError::config_parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConfigParse`] if serialization fails.
    pub fn to_json(&self) -> SessionResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SessionError::config_parse(e.to_string()))
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for `SessionConfig`.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    #[must_use]
    pub fn lightbar_disabled(mut self, disabled: bool) -> Self {
        self.config.lightbar_disabled = disabled;
        self
    }

    #[must_use]
    pub fn rumble_disabled(mut self, disabled: bool) -> Self {
        self.config.rumble_disabled = disabled;
        self
    }

    #[must_use]
    pub fn lightbar_brightness(mut self, brightness: u8) -> Self {
        self.config.lightbar_brightness = brightness;
        self
    }

    #[must_use]
    pub fn update_rate(mut self, rate: UpdateRate) -> Self {
        self.config.update_rate = rate;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> SessionResult<SessionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Where the session reads its configuration from.
pub trait ConfigSource: Send + Sync {
    /// The configuration in effect right now.
    fn current(&self) -> SessionConfig;
}

impl ConfigSource for SessionConfig {
    fn current(&self) -> SessionConfig {
        *self
    }
}

/// Configuration shared with a settings UI or service; edits apply on the
/// next tick.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<SessionConfig>>,
}

impl SharedConfig {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Apply an edit. The result is validated and discarded if invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if the edited configuration fails validation; the
    /// stored configuration is left unchanged.
    pub fn update(&self, edit: impl FnOnce(&mut SessionConfig)) -> SessionResult<()> {
        let mut guard = self.inner.write();
        let mut candidate = *guard;
        edit(&mut candidate);
        candidate.validate()?;
        *guard = candidate;
        Ok(())
    }
}

impl ConfigSource for SharedConfig {
    fn current(&self) -> SessionConfig {
        *self.inner.read()
    }
}
