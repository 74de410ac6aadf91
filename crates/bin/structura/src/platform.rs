//! Configuration-backed [`VersionCodeProvider`].

use structura_app::ports::VersionCodeProvider;
use structura_domain::error::{PlatformError, StructuraError};

use crate::config::AppConfig;

/// Reports the version code declared in the `[app]` configuration section.
#[derive(Debug, Clone)]
pub struct ConfiguredVersion {
    package: String,
    version_code: Option<u64>,
}

impl From<&AppConfig> for ConfiguredVersion {
    fn from(config: &AppConfig) -> Self {
        Self {
            package: config.package.clone(),
            version_code: config.version_code,
        }
    }
}

impl VersionCodeProvider for ConfiguredVersion {
    fn version_code(&self) -> Result<u64, StructuraError> {
        self.version_code.ok_or_else(|| {
            PlatformError::VersionUnavailable {
                package: self.package.clone(),
            }
            .into()
        })
    }
}
