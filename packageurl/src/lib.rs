#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::borrow::Cow;

pub use builder::*;
pub use fields::{PurlFields, QualifierValue};
#[cfg(feature = "package-type")]
pub use package_type::*;
pub use parse::*;
pub use qualifiers::Qualifiers;
#[cfg(feature = "smartstring")]
use smartstring::{LazyCompact, SmartString};

mod builder;
mod encoding;
mod fields;
mod format;
#[cfg(feature = "package-type")]
mod package_type;
mod parse;
pub mod qualifiers;
mod validate;

/// The URL scheme of every PURL.
pub const SCHEME: &str = "pkg";

/// A string that may be stored inline instead of on the heap.
///
/// PURLs may contain many small strings so this saves on heap allocations.
// This needs to be public because it gets exposed in some methods of Qualifiers.
#[cfg(feature = "smartstring")]
pub type SmallString = SmartString<LazyCompact>;
// When compiling without smartstring we'll just use regular Strings.
#[cfg(not(feature = "smartstring"))]
pub type SmallString = String;

/// A type that provides package-type-specific behavior.
///
/// [`PackageType`] implements the rules of the known ecosystems and passes
/// unknown types through. If you only want the type-agnostic validation, use
/// [`String`].
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
/// use std::str::FromStr;
///
/// use packageurl::{GenericPurl, ParseError, PurlField, PurlParts, PurlShape};
///
/// enum MyPackageType {
///     Internal,
/// }
///
/// impl FromStr for MyPackageType {
///     type Err = ParseError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         if s.eq_ignore_ascii_case("internal") {
///             Ok(MyPackageType::Internal)
///         } else {
///             Err(ParseError::InvalidPackageType)
///         }
///     }
/// }
///
/// impl PurlShape for MyPackageType {
///     type Error = ParseError;
///
///     fn package_type(&self) -> Cow<str> {
///         Cow::Borrowed("internal")
///     }
///
///     fn finish(&mut self, parts: &mut PurlParts) -> Result<(), Self::Error> {
///         // Internal packages always carry a team namespace.
///         if parts.namespace.is_empty() {
///             return Err(ParseError::MissingRequiredField(PurlField::Namespace));
///         }
///         Ok(())
///     }
/// }
///
/// type Purl = GenericPurl<MyPackageType>;
///
/// assert!(Purl::from_str("pkg:internal/platform/tool").is_ok());
/// assert!(matches!(
///     Purl::from_str("pkg:internal/tool"),
///     Err(ParseError::MissingRequiredField(PurlField::Namespace)),
/// ));
/// ```
pub trait PurlShape {
    /// The type of error returned by this package type.
    type Error: From<ParseError>;

    /// Get the string representation of this `PurlShape`.
    ///
    /// The returned value should be a lower case string. If the returned value
    /// contains invalid characters, `Display` and `to_string` will panic.
    #[must_use]
    fn package_type(&self) -> Cow<str>;

    /// Preview and potentially modify the parts that make up a PURL.
    ///
    /// This is called after the type-agnostic checks have passed when a
    /// [`GenericPurl`] is being created. It gives the `PurlShape`
    /// implementation a chance to perform normalization and type-specific
    /// validation.
    fn finish(&mut self, parts: &mut PurlParts) -> Result<(), Self::Error>;
}

/// A [`PurlShape`] that accepts any package type but only applies the
/// type-agnostic rules.
///
/// The package type is converted to lowercase.
impl PurlShape for String {
    type Error = ParseError;

    fn package_type(&self) -> Cow<str> {
        Cow::Borrowed(self)
    }

    fn finish(&mut self, _parts: &mut PurlParts) -> Result<(), Self::Error> {
        if !is_valid_package_type(self) {
            return Err(ParseError::InvalidPackageType);
        }
        self.make_ascii_lowercase();
        Ok(())
    }
}

/// The parts that make up a PURL, minus the package type.
///
/// An empty string means that the field is not set.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[must_use]
pub struct PurlParts {
    /// The namespace, with segments joined by `/`.
    pub namespace: SmallString,
    /// The name.
    pub name: SmallString,
    /// The version.
    pub version: SmallString,
    /// The qualifiers.
    pub qualifiers: Qualifiers,
    /// The subpath, with segments joined by `/`.
    pub subpath: SmallString,
}

/// An immutable, validated PURL.
///
/// This type does not directly include any package-type-specific behavior. Any
/// package-type-specific behavior is added using [`PurlShape`].
///
/// # Example
///
/// ```
/// use packageurl::GenericPurl;
///
/// // Use the builder if you want to set fields besides the type and name.
/// let purl = GenericPurl::builder(String::from("npm"), "my-package")
///     .with_version("1.2.3")
///     .build()
///     .unwrap();
///
/// assert_eq!("pkg:npm/my-package@1.2.3", &purl.to_string());
/// ```
///
/// # See also
///
/// See [`Purl`] for information about using the built-in [`PackageType`] enum.
///
/// See [`PurlShape`] if you want to use your own package types.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[must_use]
pub struct GenericPurl<T> {
    package_type: T,
    parts: PurlParts,
}

impl<T> GenericPurl<T> {
    /// Create a new [`GenericPurlBuilder`].
    pub fn builder<S>(package_type: T, name: S) -> GenericPurlBuilder<T>
    where
        SmallString: From<S>,
        T: PurlShape,
    {
        GenericPurlBuilder::new(package_type, name)
    }

    /// Create a new PURL.
    ///
    /// An error will be returned if the [`PurlShape`] implementation `T`
    /// requires additional fields to be specified for `package_type`. For
    /// example, `Purl::new(PackageType::Cran, "my-package")` will fail because
    /// CRAN requires a version. In that case, you must use [`Self::builder`]
    /// to set the additional required fields.
    pub fn new<S>(package_type: T, name: S) -> Result<Self, T::Error>
    where
        SmallString: From<S>,
        T: PurlShape,
    {
        Self::builder(package_type, name).build()
    }

    /// Get the URL scheme, which is always `pkg`.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        SCHEME
    }

    /// Get the package type.
    #[must_use]
    pub fn package_type(&self) -> &T {
        &self.package_type
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        Some(&*self.parts.namespace).filter(|v| !v.is_empty())
    }

    /// Iterate over the segments of the namespace.
    pub fn namespace_segments(&self) -> impl Iterator<Item = &str> {
        self.namespace().into_iter().flat_map(|ns| ns.split('/'))
    }

    /// Get the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.parts.name
    }

    /// Get the version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        Some(&*self.parts.version).filter(|v| !v.is_empty())
    }

    /// Get the qualifiers.
    #[must_use]
    pub fn qualifiers(&self) -> &Qualifiers {
        &self.parts.qualifiers
    }

    /// Get the subpath.
    #[must_use]
    pub fn subpath(&self) -> Option<&str> {
        Some(&*self.parts.subpath).filter(|v| !v.is_empty())
    }

    /// Iterate over the segments of the subpath.
    pub fn subpath_segments(&self) -> impl Iterator<Item = &str> {
        self.subpath().into_iter().flat_map(|sp| sp.split('/'))
    }

    /// Convert this PURL into a mutable form.
    pub fn into_builder(self) -> GenericPurlBuilder<T> {
        let GenericPurl { package_type, parts } = self;
        GenericPurlBuilder { package_type, parts }
    }
}

/// Check whether a package type string is valid according to the rules of the
/// PURL spec.
///
/// Upper case letters are accepted here; they are folded to lower case when
/// the PURL is built.
#[must_use]
fn is_valid_package_type(package_type: &str) -> bool {
    // https://github.com/package-url/purl-spec/blob/master/PURL-SPECIFICATION.rst#rules-for-each-purl-component
    const ALLOWED_SPECIAL_CHARS: &[char] = &['.', '+', '-'];
    package_type.starts_with(|c: char| c.is_ascii_alphabetic())
        && package_type
            .chars()
            .skip(1)
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
}

/// Try to convert a `SmallString` to lowercase without allocating.
#[cfg_attr(not(feature = "package-type"), allow(dead_code))]
fn lowercase_in_place(s: &mut SmallString) {
    enum State {
        Lower,
        MixedAscii,
        MixedUnicode,
    }
    let mut state = State::Lower;
    for c in s.chars() {
        if c.is_uppercase() {
            if c.is_ascii() {
                state = State::MixedAscii;
            } else {
                state = State::MixedUnicode;
                break;
            }
        }
    }
    match state {
        State::Lower => {},
        State::MixedAscii => {
            s.make_ascii_lowercase();
        },
        State::MixedUnicode => {
            *s = s.chars().flat_map(|c| c.to_lowercase()).collect();
        },
    }
}
