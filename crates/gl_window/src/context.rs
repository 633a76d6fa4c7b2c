//! Requests for a non-default OpenGL context
//!
//! The lifecycle manager always creates a baseline context first. A
//! [`ContextRequest`] asks the platform for a specific version and profile on
//! top of it; if the requested context cannot be created or activated, the
//! window keeps the baseline.

use serde::{Deserialize, Serialize};

/// OpenGL context profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextProfile {
    /// Core profile, no deprecated functionality
    #[default]
    Core,
    /// Compatibility profile
    Compatibility,
}

/// Version and profile of a requested context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextRequest {
    /// Major GL version
    pub major: u8,
    /// Minor GL version
    pub minor: u8,
    /// Requested profile
    pub profile: ContextProfile,
    /// Ask the driver for a debug context
    pub debug: bool,
}

impl ContextRequest {
    /// Core profile context of the given version
    pub const fn core(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            profile: ContextProfile::Core,
            debug: false,
        }
    }

    /// Compatibility profile context of the given version
    pub const fn compatibility(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            profile: ContextProfile::Compatibility,
            debug: false,
        }
    }

    /// Request a debug context
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Profiles only exist from GL 3.2 onward
    pub const fn has_profile(&self) -> bool {
        self.major > 3 || (self.major == 3 && self.minor >= 2)
    }
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self::core(3, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_availability() {
        assert!(!ContextRequest::core(3, 1).has_profile());
        assert!(ContextRequest::core(3, 2).has_profile());
        assert!(ContextRequest::compatibility(4, 0).has_profile());
        assert!(!ContextRequest::core(2, 1).has_profile());
    }

    #[test]
    fn test_builders() {
        let request = ContextRequest::compatibility(4, 6).with_debug(true);
        assert_eq!(request.profile, ContextProfile::Compatibility);
        assert!(request.debug);
        assert_eq!(ContextRequest::default(), ContextRequest::core(3, 3));
    }
}
