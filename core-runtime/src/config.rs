//! # Player Configuration
//!
//! Configuration for the playback controller.
//!
//! ## Overview
//!
//! Two layers:
//!
//! - [`PlaybackSettings`]: plain tunables (status tick rate, event buffer).
//!   Serializable so hosts can ship them in a JSON settings document.
//! - [`PlayerConfig`]: the settings plus the host capabilities the controller
//!   cannot run without. Built through [`PlayerConfigBuilder`], which fails
//!   fast with an actionable [`Error::CapabilityMissing`] when a required
//!   bridge is absent.
//!
//! ## Required Capabilities
//!
//! - `MediaEngineFactory` - constructs the platform decode/output engine
//! - `ResourceResolver` - opens packaged resources and bundled assets
//!
//! When the `desktop-shims` feature is enabled, the headless desktop engine
//! and the Tokio resource resolver are injected if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{PlayerConfig, PlaybackSettings};
//! use std::sync::Arc;
//!
//! let config = PlayerConfig::builder()
//!     .engine_factory(Arc::new(AndroidMediaPlayerFactory::new(env)))
//!     .resource_resolver(Arc::new(AndroidResources::new(context)))
//!     .settings(PlaybackSettings::from_json(r#"{ "tick_interval_ms": 250 }"#)?)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{MediaEngineFactory, ResourceResolver};
use core_async::time;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for the status tick; anything slower is useless for a seek bar.
const MAX_TICK_INTERVAL_MS: u64 = 10_000;

/// Tunables for the playback controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Interval between periodic status snapshots.
    ///
    /// Default: 200 ms.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Capacity of the event broadcast channel. Subscribers that fall further
    /// behind than this skip events.
    ///
    /// Default: 64.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl PlaybackSettings {
    /// Parse settings from a JSON document. Missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(document)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config(
                "Status tick interval must be greater than 0 ms".to_string(),
            ));
        }

        if self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(Error::Config(format!(
                "Status tick interval exceeds maximum of {} ms",
                MAX_TICK_INTERVAL_MS
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_event_buffer_size() -> usize {
    64
}

/// Capabilities and settings required to construct a playback controller.
#[derive(Clone)]
pub struct PlayerConfig {
    pub engine_factory: Arc<dyn MediaEngineFactory>,
    pub resource_resolver: Arc<dyn ResourceResolver>,
    pub settings: PlaybackSettings,
}

impl std::fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("engine_factory", &"MediaEngineFactory { ... }")
            .field("resource_resolver", &"ResourceResolver { ... }")
            .field("settings", &self.settings)
            .finish()
    }
}

impl PlayerConfig {
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_engine_factory() -> Result<Arc<dyn MediaEngineFactory>> {
    Err(Error::missing(
        "MediaEngineFactory",
        "A MediaEngineFactory is required to construct playback engines. \
         Desktop: enable the 'desktop-shims' feature to use the headless engine. \
         Mobile: inject a factory wrapping the platform player (MediaPlayer/AVPlayer).",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_engine_factory() -> Result<Arc<dyn MediaEngineFactory>> {
    Ok(Arc::new(bridge_desktop::HeadlessEngineFactory::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_resource_resolver() -> Result<Arc<dyn ResourceResolver>> {
    Err(Error::missing(
        "ResourceResolver",
        "A ResourceResolver is required to open packaged resources and assets. \
         Desktop: enable the 'desktop-shims' feature to use TokioResourceResolver. \
         Mobile: inject an adapter over Resources/AssetManager or the app bundle.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_resource_resolver() -> Result<Arc<dyn ResourceResolver>> {
    Ok(Arc::new(bridge_desktop::TokioResourceResolver::default()))
}

/// Builder for [`PlayerConfig`].
#[derive(Default)]
pub struct PlayerConfigBuilder {
    engine_factory: Option<Arc<dyn MediaEngineFactory>>,
    resource_resolver: Option<Arc<dyn ResourceResolver>>,
    settings: Option<PlaybackSettings>,
}

impl PlayerConfigBuilder {
    /// Sets the engine factory (required unless `desktop-shims` is enabled).
    pub fn engine_factory(mut self, factory: Arc<dyn MediaEngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Sets the resource resolver (required unless `desktop-shims` is enabled).
    pub fn resource_resolver(mut self, resolver: Arc<dyn ResourceResolver>) -> Self {
        self.resource_resolver = Some(resolver);
        self
    }

    pub fn settings(mut self, settings: PlaybackSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Shorthand for overriding only the status tick interval.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        let mut settings = self.settings.take().unwrap_or_default();
        settings.tick_interval_ms = time::as_millis_u64(interval);
        self.settings = Some(settings);
        self
    }

    /// Validates the settings and resolves every capability.
    pub fn build(self) -> Result<PlayerConfig> {
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let engine_factory = match self.engine_factory {
            Some(factory) => factory,
            None => provide_default_engine_factory()?,
        };

        let resource_resolver = match self.resource_resolver {
            Some(resolver) => resolver,
            None => provide_default_resource_resolver()?,
        };

        Ok(PlayerConfig {
            engine_factory,
            resource_resolver,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{error::Result as BridgeResult, AssetDescriptor, BridgeError, MediaEngine};
    use std::path::Path;

    struct NullFactory;

    impl MediaEngineFactory for NullFactory {
        fn create_engine(&self) -> BridgeResult<Box<dyn MediaEngine>> {
            Err(BridgeError::NotAvailable("null".to_string()))
        }
    }

    struct NullResolver;

    #[async_trait]
    impl ResourceResolver for NullResolver {
        async fn open_raw(&self, _id: u32) -> BridgeResult<AssetDescriptor> {
            Err(BridgeError::NotAvailable("null".to_string()))
        }

        async fn open_asset(&self, _path: &str) -> BridgeResult<AssetDescriptor> {
            Err(BridgeError::NotAvailable("null".to_string()))
        }

        async fn file_exists(&self, _path: &Path) -> BridgeResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = PlaybackSettings::default();
        assert_eq!(settings.tick_interval_ms, 200);
        assert_eq!(settings.tick_interval(), Duration::from_millis(200));
        assert_eq!(settings.event_buffer_size, 64);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings = PlaybackSettings::from_json(r#"{ "tick_interval_ms": 250 }"#).unwrap();
        assert_eq!(settings.tick_interval_ms, 250);
        assert_eq!(settings.event_buffer_size, 64);
    }

    #[test]
    fn test_settings_reject_zero_tick() {
        let result = PlaybackSettings::from_json(r#"{ "tick_interval_ms": 0 }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_reject_malformed_json() {
        let result = PlaybackSettings::from_json("{ tick_interval_ms: }");
        assert!(matches!(result, Err(Error::Settings(_))));
    }

    #[test]
    fn test_settings_reject_zero_buffer() {
        let settings = PlaybackSettings {
            event_buffer_size: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_builder_with_explicit_capabilities() {
        let config = PlayerConfig::builder()
            .engine_factory(Arc::new(NullFactory))
            .resource_resolver(Arc::new(NullResolver))
            .tick_interval(Duration::from_millis(100))
            .build()
            .unwrap();

        assert_eq!(config.settings.tick_interval_ms, 100);
        assert!(format!("{:?}", config).contains("MediaEngineFactory"));
    }

    #[test]
    fn test_builder_rejects_invalid_settings() {
        let result = PlayerConfig::builder()
            .engine_factory(Arc::new(NullFactory))
            .resource_resolver(Arc::new(NullResolver))
            .tick_interval(Duration::ZERO)
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_saturates_oversized_tick_interval() {
        // 2^64 + 384 ms: a wrapping cast would land on a valid 384 ms tick.
        let result = PlayerConfig::builder()
            .engine_factory(Arc::new(NullFactory))
            .resource_resolver(Arc::new(NullResolver))
            .tick_interval(Duration::from_secs(18_446_744_073_709_552))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_missing_engine_factory() {
        let result = PlayerConfig::builder()
            .resource_resolver(Arc::new(NullResolver))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "MediaEngineFactory");
                assert!(message.contains("desktop-shims"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_missing_resource_resolver() {
        let result = PlayerConfig::builder()
            .engine_factory(Arc::new(NullFactory))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "ResourceResolver"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_builder_uses_desktop_defaults() {
        let config = PlayerConfig::builder().build().unwrap();
        assert_eq!(config.settings, PlaybackSettings::default());
    }
}
