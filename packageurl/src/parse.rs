//! Support for parsing PURLs.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::encoding::{decode, is_relative_segment, segments};
use crate::{
    is_valid_package_type, GenericPurl, GenericPurlBuilder, PurlParts, PurlShape, Qualifiers,
    SmallString, SCHEME,
};

/// An error returned when a PURL is malformed or breaks a rule of its package
/// type.
///
/// The `Display` implementation gives a short, human-readable reason.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The URL scheme is not pkg.
    ///
    /// # Example
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use packageurl::{GenericPurl, ParseError};
    ///
    /// assert!(matches!(
    ///     GenericPurl::<String>::from_str("http://example.com"),
    ///     Err(ParseError::UnsupportedUrlScheme),
    /// ));
    /// ```
    #[error("URL scheme must be pkg")]
    UnsupportedUrlScheme,
    /// A required field is missing or empty.
    ///
    /// This is also the error for a builder that was given an empty type or
    /// name.
    ///
    /// # Example
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use packageurl::{GenericPurl, ParseError, PurlField};
    ///
    /// assert!(matches!(
    ///     GenericPurl::<String>::from_str("pkg:npm"),
    ///     Err(ParseError::MissingRequiredField(PurlField::Name)),
    /// ));
    /// ```
    #[error("{0} is required")]
    MissingRequiredField(PurlField),
    /// The package type contains invalid characters.
    ///
    /// # Example
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use packageurl::{GenericPurl, ParseError};
    ///
    /// assert!(matches!(
    ///     // Because the package type was omitted,
    ///     // the namespace is seen to be the package type.
    ///     GenericPurl::<String>::from_str("pkg:@acme/example"),
    ///     Err(ParseError::InvalidPackageType),
    /// ));
    /// ```
    #[error("Invalid package type")]
    InvalidPackageType,
    /// A qualifier key contains invalid characters.
    ///
    /// # Example
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use packageurl::{GenericPurl, ParseError};
    ///
    /// assert!(matches!(
    ///     GenericPurl::<String>::from_str("pkg:npm/example?in%20valid=1"),
    ///     Err(ParseError::InvalidQualifier),
    /// ));
    /// ```
    #[error("Invalid qualifier key")]
    InvalidQualifier,
    /// An escape sequence does not decode to UTF-8.
    ///
    /// # Example
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use packageurl::{GenericPurl, ParseError};
    ///
    /// assert!(matches!(
    ///     GenericPurl::<String>::from_str("pkg:npm/%80"),
    ///     Err(ParseError::InvalidEscape),
    /// ));
    /// ```
    #[error("An escape sequence contains invalid characters")]
    InvalidEscape,
    /// A field still contains percent-encoded characters after decoding.
    #[error("{0} must not contain percent-encoded characters")]
    EncodedField(PurlField),
    /// A namespace or subpath contains an empty segment.
    #[error("{0} must not contain empty segments")]
    EmptySegment(PurlField),
    /// The subpath contains a `.` or `..` segment.
    #[error("subpath must not contain '.' or '..' segments")]
    RelativeSegment,
    /// The package type does not allow this field.
    ///
    /// Returned by [`PurlShape::finish`](crate::PurlShape::finish), for
    /// example when a `nuget` PURL has a namespace.
    #[error("{0} is not allowed")]
    FieldNotAllowed(PurlField),
    /// The package type limits the number of segments in this field.
    #[error("{field} must not have more than {max} segments")]
    TooManySegments {
        /// The field with too many segments.
        field: PurlField,
        /// The maximum number of segments.
        max: usize,
    },
    /// The package type requires this field and a qualifier to be used
    /// together.
    #[error("{field} and the {qualifier} qualifier must be present together")]
    UnpairedQualifier {
        /// The field.
        field: PurlField,
        /// The qualifier key.
        qualifier: &'static str,
    },
    /// The name does not follow the naming rules of the package type.
    #[error("name {0}")]
    InvalidName(&'static str),
}

// This is a workaround for a typing issue. `<String as FromStr>::Err =
// Infalible`, which the compiler considers to be a normal error type.
impl From<Infallible> for ParseError {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}

/// A specific, fixed field of a PURL.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PurlField {
    /// The type, also known as the protocol.
    ///
    /// For example, "npm" in `pkg:npm/my-package`.
    PackageType,
    /// The namespace.
    ///
    /// For example, "my.company" in `pkg:maven/my.company/my-package`.
    Namespace,
    /// The name.
    ///
    /// For example, "my-package" in `pkg:npm/my-package`.
    Name,
    /// The version.
    ///
    /// For example, "1.0" in `pkg:npm/my-package@1.0`.
    Version,
    /// The subpath.
    ///
    /// For example, "lib" in `pkg:golang/github.com/my-company/my-package#lib`.
    Subpath,
}

impl PurlField {
    /// Get a `&'static str` representing the `PurlField`.
    pub const fn name(&self) -> &'static str {
        match self {
            PurlField::PackageType => "type",
            PurlField::Namespace => "namespace",
            PurlField::Name => "name",
            PurlField::Version => "version",
            PurlField::Subpath => "subpath",
        }
    }
}

impl From<PurlField> for &'static str {
    fn from(value: PurlField) -> Self {
        value.name()
    }
}

impl fmt::Display for PurlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<T> FromStr for GenericPurl<T>
where
    T: FromStr + PurlShape,
    <T as PurlShape>::Error: From<<T as FromStr>::Err>,
{
    type Err = T::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // https://github.com/package-url/purl-spec/blob/master/PURL-SPECIFICATION.rst#how-to-parse-a-purl-string-in-its-components
        let mut parts = PurlParts::default();

        // Remove subpath and qualifiers from the end first because they have higher
        // precedence than the other separators.
        let s = match s.rsplit_once('#') {
            Some((s, subpath)) => {
                parts.subpath = decode_subpath(subpath)?;
                s
            },
            None => s,
        };

        let s = match s.rsplit_once('?') {
            Some((s, qualifiers)) => {
                decode_qualifiers(qualifiers, &mut parts.qualifiers)?;
                s
            },
            None => s,
        };

        let s = match s.split_once(':') {
            Some((scheme, s)) if scheme == SCHEME => s,
            _ => return Err(ParseError::UnsupportedUrlScheme.into()),
        };

        // PURLs are not supposed to have any slashes after the scheme, but parsers
        // must ignore them.
        let s = s.trim_start_matches('/');
        let s = s.strip_suffix('/').unwrap_or(s);

        let (package_type, s) = match s.split_once('/') {
            Some((package_type, s)) if !package_type.is_empty() => (package_type, s),
            None if !s.is_empty() => {
                return Err(ParseError::MissingRequiredField(PurlField::Name).into())
            },
            _ => return Err(ParseError::MissingRequiredField(PurlField::PackageType).into()),
        };

        if !is_valid_package_type(package_type) {
            return Err(ParseError::InvalidPackageType.into());
        }

        let package_type = T::from_str(package_type)?;

        let s = match s.rsplit_once('@') {
            Some((s, version)) => {
                parts.version = decode(version)?.into();
                s
            },
            None => s,
        };

        // The namespace is optional so we may not have any more slashes.
        let name = match s.rsplit_once('/') {
            Some((namespace, s)) => {
                parts.namespace = decode_namespace(namespace)?;
                s
            },
            None => s,
        };

        parts.name = decode(name)?.into();

        GenericPurlBuilder { package_type, parts }.build()
    }
}

fn decode_subpath(subpath: &str) -> Result<SmallString, ParseError> {
    let mut rebuilt = SmallString::new();
    for segment in segments(subpath) {
        if segment.is_empty() {
            continue;
        }
        let decoded = decode(segment)?;
        if is_relative_segment(&decoded) {
            continue;
        }
        if !rebuilt.is_empty() {
            rebuilt.push('/');
        }
        rebuilt.push_str(&decoded);
    }

    Ok(rebuilt)
}

fn decode_qualifiers(s: &str, qualifiers: &mut Qualifiers) -> Result<(), ParseError> {
    for qualifier in s.split('&') {
        // Anything that is not a key-value pair is ignored.
        let Some((k, v)) = qualifier.split_once('=') else {
            continue;
        };

        // Empty qualifiers are the same as unset qualifiers.
        let v = decode(v)?;
        if v.is_empty() {
            continue;
        }

        // A repeated key replaces the earlier value.
        if let Some(previous) = qualifiers.insert(k, v)? {
            tracing::trace!(key = k, %previous, "Replaced duplicate qualifier");
        }
    }

    Ok(())
}

fn decode_namespace(namespace: &str) -> Result<SmallString, ParseError> {
    let mut rebuilt = SmallString::new();
    for segment in segments(namespace) {
        if segment.is_empty() {
            continue;
        }
        let decoded = decode(segment)?;
        if !rebuilt.is_empty() {
            rebuilt.push('/');
        }
        rebuilt.push_str(&decoded);
    }

    Ok(rebuilt)
}

#[cfg(feature = "serde")]
mod de {
    use std::marker::PhantomData;

    use serde::de::{Error, Visitor};
    use serde::Deserialize;

    use super::*;

    impl<'de, T> Deserialize<'de> for GenericPurl<T>
    where
        T: FromStr + PurlShape,
        <T as PurlShape>::Error: fmt::Display + From<<T as FromStr>::Err>,
    {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: ::serde::Deserializer<'de>,
        {
            deserializer.deserialize_str(PurlVisitor(PhantomData))
        }
    }

    struct PurlVisitor<T>(PhantomData<T>);

    impl<T> Visitor<'_> for PurlVisitor<T>
    where
        T: FromStr + PurlShape,
        <T as PurlShape>::Error: fmt::Display + From<<T as FromStr>::Err>,
    {
        type Value = GenericPurl<T>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("A PURL string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            GenericPurl::<T>::from_str(v).map_err(Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parse_when_empty_returns_error() {
        let error = GenericPurl::<String>::from_str("").unwrap_err();
        assert!(matches!(error, ParseError::UnsupportedUrlScheme));
    }

    #[test]
    fn parse_without_scheme_returns_error() {
        let error = GenericPurl::<String>::from_str("invalid").unwrap_err();
        assert!(matches!(error, ParseError::UnsupportedUrlScheme));
    }

    #[test]
    fn parse_with_uppercase_scheme_returns_error() {
        let error = GenericPurl::<String>::from_str("PKG:type/name").unwrap_err();
        assert!(matches!(error, ParseError::UnsupportedUrlScheme));
    }

    #[test]
    fn parse_without_type_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:").unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::PackageType)));
    }

    #[test]
    fn parse_with_leading_slash_and_no_name_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:/type").unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::Name)));
    }

    #[test]
    fn parse_without_name_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type").unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::Name)));
    }

    #[test]
    fn parse_with_only_trailing_slash_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type/").unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::Name)));
    }

    #[test]
    fn parse_ignores_slashes_after_scheme() {
        let parsed = GenericPurl::<String>::from_str("pkg://type/name").unwrap();
        assert_eq!("pkg:type/name", &parsed.to_string());
    }

    #[test]
    fn parse_ignores_one_trailing_slash() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/namespace/name/").unwrap();
        assert_eq!(Some("namespace"), parsed.namespace());
        assert_eq!("name", parsed.name());
    }

    #[test]
    fn parse_when_type_invalid_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:@invalid/name").unwrap_err();
        assert!(matches!(error, ParseError::InvalidPackageType));
    }

    #[test]
    fn parse_when_type_is_escaped_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:n%70m/name").unwrap_err();
        assert!(matches!(error, ParseError::InvalidPackageType));
    }

    #[test]
    fn parse_lowercases_type() {
        let parsed = GenericPurl::<String>::from_str("pkg:TYPE/Name").unwrap();
        assert_eq!("type", parsed.package_type());
        assert_eq!("Name", parsed.name());
    }

    #[test]
    fn parse_when_qualifier_without_separator_skips_it() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name?flag&a=b").unwrap();
        assert_eq!("pkg:type/name?a=b", &parsed.to_string());
    }

    #[test]
    fn parse_when_qualifier_key_invalid_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type/name?!=1").unwrap_err();
        assert!(matches!(error, ParseError::InvalidQualifier));
    }

    #[test]
    fn parse_when_qualifier_key_starts_with_separator_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type/name?_key=1").unwrap_err();
        assert!(matches!(error, ParseError::InvalidQualifier));
    }

    #[test]
    fn parse_when_escape_contains_illegal_chars_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type/%80").unwrap_err();
        assert!(matches!(error, ParseError::InvalidEscape));
    }

    #[test]
    fn parse_when_name_decodes_to_escape_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type/%2541").unwrap_err();
        assert!(matches!(error, ParseError::EncodedField(PurlField::Name)));
    }

    #[test]
    fn parse_when_version_decodes_to_escape_returns_error() {
        let error = GenericPurl::<String>::from_str("pkg:type/name@%2541").unwrap_err();
        assert!(matches!(error, ParseError::EncodedField(PurlField::Version)));
    }

    #[test]
    fn parse_when_namespace_contains_weird_components_preserves_them() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/a//b/./c/../d/name").unwrap();
        assert_eq!(Some("a/b/./c/../d"), parsed.namespace());
        assert_eq!("pkg:type/a/b/./c/../d/name", &parsed.to_string());
    }

    #[test]
    fn parse_when_subpath_contains_weird_components_preserves_them() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name#a/.../b/").unwrap();
        assert_eq!("pkg:type/name#a/.../b", &parsed.to_string());
    }

    #[test]
    fn parse_when_subpath_contains_invalid_components_skips_them() {
        let parsed =
            GenericPurl::<String>::from_str("pkg:type/name#/a//b/./c/../%2E%2E/d/").unwrap();
        assert_eq!(Some("a/b/c/d"), parsed.subpath());
        assert_eq!("pkg:type/name#a/b/c/d", &parsed.to_string());
    }

    #[test]
    fn parse_when_subpath_has_only_invalid_components_unsets_it() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name#/./../").unwrap();
        assert_eq!(None, parsed.subpath());
    }

    #[test]
    fn parse_decodes_subpath_segments() {
        let parsed = GenericPurl::<String>::from_str(
            "pkg:golang/google.golang.org/genproto#googleapis%20api%20annotations",
        )
        .unwrap();
        assert_eq!(Some("googleapis api annotations"), parsed.subpath());
    }

    #[test]
    fn parse_when_qualifiers_are_duplicated_keeps_last() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name?a=a&A=b").unwrap();
        assert_eq!(Some("b"), parsed.qualifiers().get("a"));
        assert_eq!(1, parsed.qualifiers().len());
    }

    #[test]
    fn parse_when_qualifier_has_no_value_skips_it() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name?a=&b=%20").unwrap();
        assert_eq!("pkg:type/name?b=%20", &parsed.to_string());
    }

    #[test]
    fn parse_when_qualifier_has_empty_key_and_value_skips_it() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name?=").unwrap();
        assert!(parsed.qualifiers().is_empty());
    }

    #[test]
    fn parse_decodes_qualifier_values_literally() {
        let parsed =
            GenericPurl::<String>::from_str("pkg:type/name?url=https%3A%2F%2Fexample.com%2Fa+b")
                .unwrap();
        assert_eq!(Some("https://example.com/a+b"), parsed.qualifiers().get("url"));
    }

    #[test]
    fn parse_when_version_is_empty_unsets_it() {
        let parsed = GenericPurl::<String>::from_str("pkg:type/name@").unwrap();
        assert_eq!(None, parsed.version());
    }

    #[test]
    fn parse_parses_fields() {
        let purl =
            GenericPurl::<String>::from_str("pkg:type/namespace/name@version?key=value#subpath")
                .unwrap();
        assert_eq!("type", purl.package_type());
        assert_eq!(Some("namespace"), purl.namespace());
        assert_eq!("name", purl.name());
        assert_eq!(Some("version"), purl.version());
        assert_eq!(Some("value"), purl.qualifiers().get("key"));
        assert_eq!(Some("subpath"), purl.subpath());
    }

    #[test]
    fn parse_splits_version_on_last_at_sign() {
        let purl = GenericPurl::<String>::from_str("pkg:type/name@1@2").unwrap();
        assert_eq!("name@1", purl.name());
        assert_eq!(Some("2"), purl.version());
        assert_eq!("pkg:type/name%401@2", &purl.to_string());
    }

    #[test]
    fn parse_splits_subpath_on_last_hash() {
        let purl = GenericPurl::<String>::from_str("pkg:type/name#a#b").unwrap();
        assert_eq!(Some("b"), purl.subpath());
        assert_eq!("name#a", purl.name());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_deserializes_correctly() {
        use serde::de::IntoDeserializer;
        use serde::Deserialize;

        let deserialized = GenericPurl::<String>::deserialize(IntoDeserializer::<
            serde::de::value::Error,
        >::into_deserializer(
            "pkg:type/name".to_owned()
        ))
        .unwrap();
        assert_eq!(GenericPurl::<String>::from_str("pkg:type/name").unwrap(), deserialized,);
    }
}
