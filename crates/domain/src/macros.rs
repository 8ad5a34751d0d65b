//! Macro for implementing wire-string conversions on state enums
//!
//! Backend states travel as upper-case strings (`"PENDING"`, `"COMPLETED"`)
//! while logs and the CLI print the same values. This macro generates one
//! consistent mapping for `Display`, `FromStr` and serde, with optional
//! fallback to a catch-all variant for values the backend may add later.
//!
//! # Example
//!
//! ```rust
//! use capture_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum JobState {
//!     Queued,
//!     Done,
//!     Other,
//! }
//!
//! impl_wire_enum_conversions!(JobState {
//!     Queued => "QUEUED",
//!     Done => "DONE",
//!     Other => "OTHER",
//! }, fallback = Other);
//!
//! assert_eq!("queued".parse::<JobState>().unwrap(), JobState::Queued);
//! assert_eq!("ARCHIVED".parse::<JobState>().unwrap(), JobState::Other);
//! ```

/// Implements Display, FromStr, Serialize and Deserialize for state enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire strings
/// * `fallback = $variant` - Optional variant returned for unknown strings;
///   without it, unknown strings are a parse error
///
/// Parsing is ASCII case-insensitive.
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? } $(, fallback = $fallback:ident)? $(,)?) => {
        impl $enum_name {
            /// Wire representation of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                let fallback: Option<Self> = None $(.or(Some(Self::$fallback)))?;
                fallback.ok_or_else(|| format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }

        impl $crate::__serde::Serialize for $enum_name {
            fn serialize<S: $crate::__serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $enum_name {
            fn deserialize<D: $crate::__serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err($crate::__serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Strict {
        Open,
        Closed,
    }

    impl_wire_enum_conversions!(Strict {
        Open => "OPEN",
        Closed => "CLOSED",
    });

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lenient {
        Known,
        Unknown,
    }

    impl_wire_enum_conversions!(Lenient {
        Known => "KNOWN",
        Unknown => "UNKNOWN",
    }, fallback = Unknown);

    #[test]
    fn test_display_uses_wire_string() {
        assert_eq!(Strict::Open.to_string(), "OPEN");
        assert_eq!(Strict::Closed.as_str(), "CLOSED");
    }

    #[test]
    fn test_fromstr_case_insensitive() {
        assert_eq!(Strict::from_str("open").unwrap(), Strict::Open);
        assert_eq!(Strict::from_str("Closed").unwrap(), Strict::Closed);
    }

    #[test]
    fn test_fromstr_unknown_without_fallback_errors() {
        let err = Strict::from_str("ajar").unwrap_err();
        assert!(err.contains("Strict"));
        assert!(err.contains("ajar"));
    }

    #[test]
    fn test_fromstr_unknown_with_fallback() {
        assert_eq!(Lenient::from_str("brand-new").unwrap(), Lenient::Unknown);
    }

    #[test]
    fn test_serde_roundtrip_through_string() {
        assert_eq!(serde_json::to_string(&Strict::Open).unwrap(), "\"OPEN\"");
        let parsed: Lenient = serde_json::from_str("\"known\"").unwrap();
        assert_eq!(parsed, Lenient::Known);
        assert!(serde_json::from_str::<Strict>("\"ajar\"").is_err());
    }
}
