//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Several request parameters are closed sets of lowercase strings
//! (`asc`/`desc`, grant types, ...). This macro keeps the mapping between
//! variants and their wire spelling in one place.
//!
//! # Example
//!
//! ```rust
//! use cirrus_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum GrantType {
//!     Password,
//!     RefreshToken,
//! }
//!
//! impl_wire_enum_conversions!(GrantType {
//!     Password => "password",
//!     RefreshToken => "refresh_token",
//! });
//!
//! assert_eq!(GrantType::Password.to_string(), "password");
//! ```

/// Implements Display, FromStr and `as_str` for wire-level enums
///
/// - `Display` and `as_str` emit the wire spelling
/// - `FromStr` parses case-insensitively and names the enum on failure
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling of this variant
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
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
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Provider {
        Facebook,
        Google,
        Twitter,
    }

    impl_wire_enum_conversions!(Provider {
        Facebook => "facebook",
        Google => "google",
        Twitter => "twitter",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(Provider::Facebook.to_string(), "facebook");
        assert_eq!(Provider::Google.as_str(), "google");
    }

    #[test]
    fn test_fromstr_ignores_case() {
        assert_eq!(Provider::from_str("twitter").unwrap(), Provider::Twitter);
        assert_eq!(Provider::from_str("GOOGLE").unwrap(), Provider::Google);
        assert_eq!(Provider::from_str("FaceBook").unwrap(), Provider::Facebook);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = Provider::from_str("myspace");
        assert!(result.unwrap_err().contains("Invalid Provider: myspace"));
        assert!(Provider::from_str("").is_err());
    }
}
