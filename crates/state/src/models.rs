//! Database row models

use garnet_errors::{Error, VersionError};
use garnet_types::{PackageId, Version};

/// One row of the `packages` table
#[derive(Debug, Clone)]
pub struct PackageRow {
    pub name: String,
    pub version: String,
    pub root: bool,
    pub reinstall: bool,
    pub updated_at: i64,
}

impl PackageRow {
    /// Convert the row into a typed package identity
    ///
    /// # Errors
    ///
    /// Returns an error if the stored version string does not parse.
    pub fn package_id(&self) -> Result<PackageId, Error> {
        let version = Version::parse(&self.version).map_err(|e| VersionError::ParseError {
            message: format!("{}-{}: {e}", self.name, self.version),
        })?;
        Ok(PackageId::new(self.name.clone(), version))
    }
}
