//! Platform port — facts about the installed client.

use structura_domain::error::StructuraError;

/// Reports the version code of the installed application.
pub trait VersionCodeProvider {
    /// Numeric version code of the running build.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::Platform`] when the host cannot report it.
    /// Callers must not substitute a default.
    fn version_code(&self) -> Result<u64, StructuraError>;
}

impl<T: VersionCodeProvider + ?Sized> VersionCodeProvider for std::sync::Arc<T> {
    fn version_code(&self) -> Result<u64, StructuraError> {
        (**self).version_code()
    }
}
