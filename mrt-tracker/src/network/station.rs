//! Station and platform identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::NetworkError;

/// Separator between the three-letter code and the platform letter.
const PLATFORM_SEPARATOR: char = '_';

/// A platform identifier such as `CTH_A`.
///
/// This is the key the upstream uses to tell apart the platforms of one
/// station, so interchanges with several platforms resolve to the right one.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(String);

impl PlatformId {
    /// Build the identifier for a three-letter code and platform letter.
    pub fn new(code3: &str, platform: &str) -> Self {
        Self(format!("{code3}{PLATFORM_SEPARATOR}{platform}"))
    }

    /// Wrap an identifier exactly as reported by the upstream.
    pub fn from_reported(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlatformId({})", self.0)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stop on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    /// Line-scoped code, e.g. `NS25`. Interchanges have one per line.
    pub code: String,
    /// Three-letter alphabetical code, e.g. `CTH`.
    pub code3: String,
    /// Platform letter serving this line direction.
    pub platform: String,
    /// Display name, also the key for station-keyed fetches.
    pub name: String,
}

impl Station {
    pub fn new(
        code: impl Into<String>,
        code3: impl Into<String>,
        platform: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            code3: code3.into(),
            platform: platform.into(),
            name: name.into(),
        }
    }

    /// The platform identifier this station is tracked by.
    pub fn platform_id(&self) -> PlatformId {
        PlatformId::new(&self.code3, &self.platform)
    }

    /// Numeric suffix of the line-scoped code after its two-letter prefix.
    ///
    /// An empty suffix (the `CG` code at Tanah Merah) counts as zero. Only
    /// used to order stations when building lines.
    pub fn code_num(&self) -> Result<u32, NetworkError> {
        let suffix = self
            .code
            .get(2..)
            .ok_or_else(|| NetworkError::InvalidCode(self.code.clone()))?;

        if suffix.is_empty() {
            return Ok(0);
        }

        suffix
            .parse()
            .map_err(|_| NetworkError::InvalidCode(self.code.clone()))
    }
}
