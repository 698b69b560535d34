use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Four 16-bit fields (major, minor, build, revision) packed into a `u64`,
/// most significant first. Zero means "no version could be determined".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u64);

impl Version {
    pub const UNKNOWN: Version = Version(0);

    pub const fn from_raw(raw: u64) -> Self {
        Version(raw)
    }

    pub const fn from_parts(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Version((major as u64) << 48 | (minor as u64) << 32 | (build as u64) << 16 | revision as u64)
    }

    /// Builds a version from the two words of a `VS_FIXEDFILEINFO`.
    pub const fn from_words(ms: u32, ls: u32) -> Self {
        Version((ms as u64) << 32 | ls as u64)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }

    pub const fn major(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub const fn minor(self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub const fn build(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn revision(self) -> u16 {
        self.0 as u16
    }

    pub const fn parts(self) -> [u16; 4] {
        [self.major(), self.minor(), self.build(), self.revision()]
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> u64 {
        version.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, build, revision] = self.parts();
        write!(f, "{major}.{minor}.{build}.{revision}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVersionError {
    #[error("expected 4 dot-separated fields, found {0}")]
    FieldCount(usize),

    #[error("field {index} is not a 16-bit number: {value:?}")]
    Field { index: usize, value: String },
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('.').collect();
        if fields.len() != 4 {
            return Err(ParseVersionError::FieldCount(fields.len()));
        }

        let mut parts = [0u16; 4];
        for (index, field) in fields.iter().enumerate() {
            let digits = field.trim();
            let bad_field = || ParseVersionError::Field {
                index,
                value: (*field).to_string(),
            };
            // u16's parser would also take a leading '+'
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_field());
            }
            parts[index] = digits.parse::<u16>().map_err(|_| bad_field())?;
        }

        let [major, minor, build, revision] = parts;
        Ok(Version::from_parts(major, minor, build, revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_survive_packing() {
        for parts in [[0, 0, 0, 1], [1, 2, 3, 4], [u16::MAX; 4], [27, 0, 0, 31353], [65535, 0, 65535, 0]] {
            let version = Version::from_parts(parts[0], parts[1], parts[2], parts[3]);
            assert_eq!(version.parts(), parts);
        }
    }

    #[test]
    fn major_occupies_the_high_bits() {
        assert_eq!(Version::from_parts(1, 2, 3, 4).as_u64(), 0x0001_0002_0003_0004);
        assert!(Version::from_parts(2, 0, 0, 0) > Version::from_parts(1, 65535, 65535, 65535));
    }

    #[test]
    fn words_match_parts() {
        assert_eq!(Version::from_words(0x001B_0000, 0x0000_7A79), Version::from_parts(27, 0, 0, 31353));
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(Version::from_parts(24, 2, 0, 190_u16).to_string(), "24.2.0.190");
    }

    #[test]
    fn zero_is_unknown() {
        assert!(Version::UNKNOWN.is_unknown());
        assert!(Version::from_parts(0, 0, 0, 0).is_unknown());
        assert!(!Version::from_parts(0, 0, 0, 1).is_unknown());
    }

    #[test]
    fn parses_dotted_strings() {
        assert_eq!("27.0.0.31353".parse(), Ok(Version::from_parts(27, 0, 0, 31353)));
        assert_eq!(" 1. 2 .3.4 ".parse(), Ok(Version::from_parts(1, 2, 3, 4)));
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!("27.0.31353".parse::<Version>(), Err(ParseVersionError::FieldCount(3)));
        assert_eq!("1.2.3.4.5".parse::<Version>(), Err(ParseVersionError::FieldCount(5)));
    }

    #[test]
    fn rejects_bad_fields() {
        assert!(matches!(
            "1.2.x.4".parse::<Version>(),
            Err(ParseVersionError::Field { index: 2, .. })
        ));
        assert!(matches!(
            "1.2.3.65536".parse::<Version>(),
            Err(ParseVersionError::Field { index: 3, .. })
        ));
        assert!(matches!("1..3.4".parse::<Version>(), Err(ParseVersionError::Field { index: 1, .. })));
        assert!(matches!("1.2.3.-4".parse::<Version>(), Err(ParseVersionError::Field { index: 3, .. })));
    }

    #[test]
    fn rejects_signed_fields() {
        assert_eq!(
            "+1.2.3.4".parse::<Version>(),
            Err(ParseVersionError::Field {
                index: 0,
                value: "+1".to_string()
            })
        );
    }
}
