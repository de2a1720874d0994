use crate::feature::{Evlrs, Feature, LargeFiles, Waveforms};
use std::fmt;

/// LAS version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// The major version.
    ///
    /// For now, always 1.
    pub major: u8,
    /// The minor version.
    pub minor: u8,
}

impl Version {
    /// Creates a new version.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::Version;
    /// let version = Version::new(1, 2);
    /// ```
    pub fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Does this version support the feature?
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::feature::Evlrs;
    /// use lasstream::Version;
    /// assert!(Version::new(1, 4).supports::<Evlrs>());
    /// assert!(!Version::new(1, 2).supports::<Evlrs>());
    /// ```
    pub fn supports<F: Feature>(&self) -> bool {
        F::is_supported_by(*self)
    }

    /// Returns the size of the standard header for this version, without user data.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::Version;
    /// assert_eq!(227, Version::new(1, 2).header_size());
    /// assert_eq!(235, Version::new(1, 3).header_size());
    /// assert_eq!(375, Version::new(1, 4).header_size());
    /// ```
    pub fn header_size(&self) -> u16 {
        if self.supports::<Evlrs>() && self.supports::<LargeFiles>() {
            375
        } else if self.supports::<Waveforms>() {
            235
        } else {
            227
        }
    }

    /// Is this a version we know how to interpret completely?
    pub fn is_known(&self) -> bool {
        self.major == 1 && self.minor <= 4
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::new(1, 2)
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
