//! Sync version gate — decides whether the installed client may synchronize.
//!
//! The server publishes a minimum client version as a structured setting.
//! Older configurations kept it as a flat value; that value is still honoured
//! when the structured setting is absent, and is refreshed whenever the
//! structured setting is read so the two stay in step.

use structura_domain::error::StructuraError;
use structura_domain::setting::{MIN_ALLOWED_APP_VERSION, MIN_ALLOWED_APP_VERSION_SETTING};
use structura_domain::version::{is_version_allowed, parse_version_code};

use crate::ports::{SettingsRepository, VersionCodeProvider};

/// Use-case answering "may this client sync?".
pub struct SyncVersionGate<S, V> {
    settings: S,
    version: V,
}

impl<S: SettingsRepository, V: VersionCodeProvider> SyncVersionGate<S, V> {
    /// Create a gate reading settings from `settings` and the installed
    /// version from `version`.
    pub fn new(settings: S, version: V) -> Self {
        Self { settings, version }
    }

    /// Whether the installed client version may synchronize.
    ///
    /// Allowed when no minimum version is configured. Otherwise allowed iff
    /// the installed version code is at least the minimum.
    ///
    /// # Errors
    ///
    /// - [`StructuraError::Platform`] if the installed version cannot be read
    /// - [`StructuraError::Validation`] if the configured minimum is malformed
    /// - a storage error from the settings repository
    #[tracing::instrument(skip(self))]
    pub async fn is_app_version_allowed(&self) -> Result<bool, StructuraError> {
        let Some(minimum) = self.min_allowed_version().await? else {
            tracing::debug!("no minimum app version configured");
            return Ok(true);
        };

        let installed = self.version.version_code()?;
        let allowed = is_version_allowed(installed, Some(minimum));
        tracing::debug!(installed, minimum, allowed, "checked app version");
        Ok(allowed)
    }

    /// Resolve the configured minimum version, structured setting first.
    ///
    /// # Errors
    ///
    /// Same as [`is_app_version_allowed`](Self::is_app_version_allowed), minus
    /// the platform error.
    pub async fn min_allowed_version(&self) -> Result<Option<u64>, StructuraError> {
        if let Some(setting) = self
            .settings
            .get_setting(MIN_ALLOWED_APP_VERSION_SETTING)
            .await?
        {
            let configuration = setting.configuration()?;
            if let Some(raw) = configuration.value_of(MIN_ALLOWED_APP_VERSION_SETTING) {
                let minimum = parse_version_code(raw)?;
                self.settings
                    .put(MIN_ALLOWED_APP_VERSION, &minimum.to_string())
                    .await?;
                return Ok(Some(minimum));
            }
        }

        match self.settings.get(MIN_ALLOWED_APP_VERSION).await? {
            Some(raw) => Ok(Some(parse_version_code(&raw)?)),
            None => Ok(None),
        }
    }
}
