//! Support for known package types.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use unicase::UniCase;

use self::rule::TypeRule;
use crate::{
    is_valid_package_type, lowercase_in_place, GenericPurl, GenericPurlBuilder, ParseError,
    PurlField, PurlParts, PurlShape, SmallString,
};

mod rule;

/// A PURL that applies the rules of the known package types.
///
/// Types that are not known are accepted as [`PackageType::Other`] and only
/// get the type-agnostic validation.
///
/// # Differences compared to other PURL implementations
///
/// - NuGet package names keep their case. NuGet itself compares names
///   case-insensitively, so two PURLs that only differ in case may refer to
///   the same package.
/// - PyPI names are lowercased and `_` is replaced with `-`. Runs of
///   separators and `.` are left alone.
/// - `+` is always a literal plus sign and is written as `%2B`. A space is
///   written as `%20`.
///
/// # Extending `PackageType`
///
/// If you want to change the behavior of a package type, you can do so via
/// delegation.
///
/// ```
/// use std::borrow::Cow;
/// use std::str::FromStr;
///
/// use packageurl::{GenericPurl, PackageType, ParseError, PurlField, PurlParts, PurlShape};
///
/// #[derive(Clone)]
/// enum MyPackageType {
///     PackageType(PackageType),
///     Custom,
/// }
///
/// type Purl = GenericPurl<MyPackageType>;
///
/// impl FromStr for MyPackageType {
///     type Err = ParseError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         // Always try your types first.
///         // Otherwise they would be treated as `PackageType::Other`.
///         if s.eq_ignore_ascii_case("custom") {
///             Ok(MyPackageType::Custom)
///         } else {
///             PackageType::from_str(s).map(MyPackageType::PackageType)
///         }
///     }
/// }
///
/// impl PurlShape for MyPackageType {
///     type Error = ParseError;
///
///     fn package_type(&self) -> Cow<str> {
///         match self {
///             MyPackageType::PackageType(t) => t.package_type(),
///             MyPackageType::Custom => Cow::Borrowed("custom"),
///         }
///     }
///
///     fn finish(&mut self, parts: &mut PurlParts) -> Result<(), Self::Error> {
///         match self {
///             MyPackageType::PackageType(t) => t.finish(parts),
///             MyPackageType::Custom => {
///                 if parts.version.is_empty() {
///                     return Err(ParseError::MissingRequiredField(PurlField::Version));
///                 }
///                 Ok(())
///             },
///         }
///     }
/// }
///
/// assert!(matches!(
///     Purl::from_str("pkg:custom/example@1.0").unwrap().package_type(),
///     MyPackageType::Custom,
/// ));
/// assert!(Purl::from_str("pkg:custom/example").is_err());
/// ```
pub type Purl = GenericPurl<PackageType>;

/// A PURL builder that supports the known package types.
pub type PurlBuilder = GenericPurlBuilder<PackageType>;

/// The package types.
///
/// Each known type has its own normalization and validation rules. See
/// [`Purl`] for details.
///
/// # Example
///
/// ```
/// use std::str::FromStr;
///
/// use packageurl::{PackageType, ParseError, Purl, PurlField};
///
/// let purl = Purl::from_str("pkg:PyPI/Django_Rest@1.0").unwrap();
/// assert_eq!(&PackageType::PyPI, purl.package_type());
/// assert_eq!("django-rest", purl.name());
///
/// assert!(matches!(
///     Purl::from_str("pkg:nuget/Microsoft/EnterpriseLibrary.Common@6.0.1304"),
///     Err(ParseError::FieldNotAllowed(PurlField::Namespace)),
/// ));
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum PackageType {
    Alpm,
    Bitbucket,
    Cargo,
    Cocoapods,
    Composer,
    Conan,
    Conda,
    Cran,
    Deb,
    Docker,
    Gem,
    Generic,
    Github,
    Golang,
    Hackage,
    Hex,
    Maven,
    Npm,
    NuGet,
    Oci,
    Pub,
    PyPI,
    Rpm,
    Swid,
    Swift,
    /// A well-formed type with no rules of its own.
    ///
    /// The name is lowercased when the PURL is built.
    Other(SmallString),
}

static PACKAGE_TYPES: phf::Map<UniCase<&'static str>, PackageType> = phf_map! {
    UniCase::ascii("alpm") => PackageType::Alpm,
    UniCase::ascii("bitbucket") => PackageType::Bitbucket,
    UniCase::ascii("cargo") => PackageType::Cargo,
    UniCase::ascii("cocoapods") => PackageType::Cocoapods,
    UniCase::ascii("composer") => PackageType::Composer,
    UniCase::ascii("conan") => PackageType::Conan,
    UniCase::ascii("conda") => PackageType::Conda,
    UniCase::ascii("cran") => PackageType::Cran,
    UniCase::ascii("deb") => PackageType::Deb,
    UniCase::ascii("docker") => PackageType::Docker,
    UniCase::ascii("gem") => PackageType::Gem,
    UniCase::ascii("generic") => PackageType::Generic,
    UniCase::ascii("github") => PackageType::Github,
    UniCase::ascii("golang") => PackageType::Golang,
    UniCase::ascii("hackage") => PackageType::Hackage,
    UniCase::ascii("hex") => PackageType::Hex,
    UniCase::ascii("maven") => PackageType::Maven,
    UniCase::ascii("npm") => PackageType::Npm,
    UniCase::ascii("nuget") => PackageType::NuGet,
    UniCase::ascii("oci") => PackageType::Oci,
    UniCase::ascii("pub") => PackageType::Pub,
    UniCase::ascii("pypi") => PackageType::PyPI,
    UniCase::ascii("rpm") => PackageType::Rpm,
    UniCase::ascii("swid") => PackageType::Swid,
    UniCase::ascii("swift") => PackageType::Swift,
};

impl PackageType {
    /// Get the name of the package type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            PackageType::Alpm => "alpm",
            PackageType::Bitbucket => "bitbucket",
            PackageType::Cargo => "cargo",
            PackageType::Cocoapods => "cocoapods",
            PackageType::Composer => "composer",
            PackageType::Conan => "conan",
            PackageType::Conda => "conda",
            PackageType::Cran => "cran",
            PackageType::Deb => "deb",
            PackageType::Docker => "docker",
            PackageType::Gem => "gem",
            PackageType::Generic => "generic",
            PackageType::Github => "github",
            PackageType::Golang => "golang",
            PackageType::Hackage => "hackage",
            PackageType::Hex => "hex",
            PackageType::Maven => "maven",
            PackageType::Npm => "npm",
            PackageType::NuGet => "nuget",
            PackageType::Oci => "oci",
            PackageType::Pub => "pub",
            PackageType::PyPI => "pypi",
            PackageType::Rpm => "rpm",
            PackageType::Swid => "swid",
            PackageType::Swift => "swift",
            PackageType::Other(name) => name,
        }
    }

    /// Check whether this type has rules of its own.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, PackageType::Other(_))
    }

    fn rules(&self) -> &'static [TypeRule] {
        match self {
            PackageType::Alpm
            | PackageType::Bitbucket
            | PackageType::Deb
            | PackageType::Github
            | PackageType::Golang
            | PackageType::Hex => rule::LOWERCASE_NAMESPACE_AND_NAME,
            PackageType::Rpm => rule::RPM,
            PackageType::Npm => rule::NPM,
            PackageType::PyPI => rule::PYPI,
            PackageType::Oci => rule::OCI,
            PackageType::NuGet => rule::NUGET,
            PackageType::Cocoapods => rule::COCOAPODS,
            PackageType::Conan => rule::CONAN,
            PackageType::Cran => rule::CRAN,
            PackageType::Hackage => rule::HACKAGE,
            PackageType::Pub => rule::PUB,
            PackageType::Swid => rule::SWID,
            PackageType::Swift => rule::SWIFT,
            PackageType::Cargo
            | PackageType::Composer
            | PackageType::Conda
            | PackageType::Docker
            | PackageType::Gem
            | PackageType::Generic
            | PackageType::Maven
            | PackageType::Other(_) => &[],
        }
    }
}

impl AsRef<str> for PackageType {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageType {
    type Err = ParseError;

    /// Look up a package type by name, ignoring case.
    ///
    /// Unknown names become [`PackageType::Other`] if they are valid package
    /// types.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(known) = PACKAGE_TYPES.get(&UniCase::new(s)) {
            return Ok(known.clone());
        }
        if s.is_empty() {
            return Err(ParseError::MissingRequiredField(PurlField::PackageType));
        }
        if !is_valid_package_type(s) {
            return Err(ParseError::InvalidPackageType);
        }
        let mut name = SmallString::from(s);
        lowercase_in_place(&mut name);
        Ok(PackageType::Other(name))
    }
}

impl PurlShape for PackageType {
    type Error = ParseError;

    fn package_type(&self) -> Cow<str> {
        Cow::Borrowed(self.name())
    }

    fn finish(&mut self, parts: &mut PurlParts) -> Result<(), Self::Error> {
        // `Other` may have been constructed directly.
        if let PackageType::Other(name) = self {
            match PACKAGE_TYPES.get(&UniCase::new(name.as_str())) {
                Some(known) => *self = known.clone(),
                None => lowercase_in_place(name),
            }
        }

        for rule in self.rules() {
            if let Err(error) = rule.apply(parts) {
                tracing::debug!(package_type = self.name(), %error, "Rejected PURL");
                return Err(error);
            }
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for PackageType {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for PackageType {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let name = Cow::<str>::deserialize(deserializer)?;
            PackageType::from_str(&name).map_err(D::Error::custom)
        }
    }
}
