//! Driver version parsing and reinstall planning

use std::cmp::Ordering;
use std::fmt;

/// Structured `major.minor[.build[.revision]]` file version
///
/// Missing trailing components order before any present component, so
/// `1.2 < 1.2.0 < 1.2.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverVersion {
    /// Major component; a change here means a breaking driver change
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Build component
    pub build: Option<u32>,
    /// Revision component, only present together with `build`
    pub revision: Option<u32>,
}

impl DriverVersion {
    /// Create a full four-component version
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build: Some(build),
            revision: Some(revision),
        }
    }

    /// Parse a version string with two to four dot-separated components.
    ///
    /// Returns `None` for anything else, including strings with trailing text
    /// such as `"5.3.0.0 built by: WinDDK"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return None;
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok().filter(|n| *n <= i32::MAX as u32)?;
        }

        Some(Self {
            major: numbers[0],
            minor: numbers[1],
            build: (parts.len() > 2).then_some(numbers[2]),
            revision: (parts.len() > 3).then_some(numbers[3]),
        })
    }
}

impl Ord for DriverVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.build.cmp(&other.build))
            .then(self.revision.cmp(&other.revision))
    }
}

impl PartialOrd for DriverVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

/// What reconciliation has to do with the installed driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverAction {
    /// Installed driver is current
    Keep,
    /// No driver installed yet
    Install,
    /// Bundled driver is newer
    Upgrade,
    /// Major versions differ and the bundled driver is not newer
    Downgrade,
    /// Versions are not comparable and their strings differ
    Replace,
}

impl DriverAction {
    /// Whether the installed driver has to be removed first
    pub fn needs_uninstall(self) -> bool {
        matches!(self, Self::Upgrade | Self::Downgrade | Self::Replace)
    }

    /// Whether the bundled driver gets copied and registered
    pub fn needs_install(self) -> bool {
        !matches!(self, Self::Keep)
    }
}

impl fmt::Display for DriverAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Keep => "up to date",
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::Replace => "replace",
        };
        f.write_str(text)
    }
}

/// Decide between keeping and reinstalling an installed driver.
///
/// Structured versions reinstall when the bundled one is newer or the major
/// components differ. Otherwise the raw strings are compared.
pub fn plan(bundled: &str, installed: &str) -> DriverAction {
    match (DriverVersion::parse(bundled), DriverVersion::parse(installed)) {
        (Some(bundled), Some(installed)) => {
            if bundled > installed {
                DriverAction::Upgrade
            } else if bundled.major != installed.major {
                DriverAction::Downgrade
            } else {
                DriverAction::Keep
            }
        }
        _ if bundled != installed => DriverAction::Replace,
        _ => DriverAction::Keep,
    }
}
