//! Well-known qualifiers for use with [`super::Qualifiers::get_typed`] and
//! [`super::Qualifiers::insert_typed`].

use std::borrow::Cow;

use hex::{FromHex, ToHex};

use crate::SmallString;

pub mod conan;

/// A type that has an associated qualifier key.
pub trait KnownQualifierKey {
    /// The key of the qualifier.
    ///
    /// This must be a valid qualifier key or attempting to set the qualifier
    /// will panic.
    const KEY: &'static str;
}

macro_rules! str_ref_qualifier {
    ($type_name:ident, $qualifier_key:literal, $human_name:literal) => {
        #[doc = concat!("A ", $human_name, " qualifier.")]
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub struct $type_name<'a>(&'a str);

        impl<'a> From<&'a str> for $type_name<'a> {
            fn from(value: &'a str) -> Self {
                $type_name(value)
            }
        }

        impl<'a> From<$type_name<'a>> for $crate::SmallString {
            fn from(value: $type_name<'a>) -> Self {
                Self::from(value.0)
            }
        }

        impl<'a> ::std::ops::Deref for $type_name<'a> {
            type Target = str;

            fn deref(&self) -> &str {
                self.0
            }
        }

        impl<'a> $crate::qualifiers::well_known::KnownQualifierKey for $type_name<'a> {
            const KEY: &'static str = $qualifier_key;
        }
    };
}
// Allow child modules to use this macro.
use str_ref_qualifier;

str_ref_qualifier!(RepositoryUrl, "repository_url", "repository URL");
str_ref_qualifier!(DownloadUrl, "download_url", "download URL");
str_ref_qualifier!(VcsUrl, "vcs_url", "VCS URL");
str_ref_qualifier!(FileName, "file_name", "file name");

/// The `checksums` qualifier.
///
/// This is the only qualifier whose value is a list. On the wire the entries
/// are joined with `,`. Each entry is normally `algorithm:hex digest`. Empty
/// entries are ignored.
///
/// # Example
///
/// ```
/// use packageurl::qualifiers::well_known::Checksums;
/// use packageurl::GenericPurl;
///
/// let sha256 =
///     hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855").unwrap();
/// let mut checksums = Checksums::default();
/// checksums.insert("sha256", sha256);
/// checksums.push("sha1:ad9503c3e994a4f611a4892f2e67ac82df727086");
/// let purl = GenericPurl::builder("type".to_owned(), "name")
///     .with_typed_qualifier(Some(checksums))
///     .build()
///     .unwrap();
/// assert_eq!(
///     "pkg:type/name?checksums=sha256:\
///      e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855,\
///      sha1:ad9503c3e994a4f611a4892f2e67ac82df727086",
///     purl.to_string(),
/// );
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Checksums<'a> {
    entries: Vec<Cow<'a, str>>,
}

impl KnownQualifierKey for Checksums<'_> {
    const KEY: &'static str = "checksums";
}

impl<'a> From<&'a str> for Checksums<'a> {
    fn from(value: &'a str) -> Self {
        Self { entries: value.split(',').filter(|e| !e.is_empty()).map(Cow::Borrowed).collect() }
    }
}

impl<'a> From<Checksums<'a>> for SmallString {
    fn from(value: Checksums<'a>) -> Self {
        let mut joined = SmallString::new();
        for entry in value.entries {
            if !joined.is_empty() {
                joined.push(',');
            }
            joined.push_str(&entry);
        }
        joined
    }
}

impl<'a> Checksums<'a> {
    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the raw entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| &**e)
    }

    /// Append a raw entry.
    pub fn push<S>(&mut self, entry: S)
    where
        S: Into<Cow<'a, str>>,
    {
        self.entries.push(entry.into());
    }

    /// Append a digest for `algorithm`, hex encoding `value`.
    pub fn insert<T>(&mut self, algorithm: &str, value: T)
    where
        T: ToHex,
    {
        let digest: String = value.encode_hex();
        self.entries.push(Cow::Owned(format!("{}:{}", algorithm.to_ascii_lowercase(), digest)));
    }

    /// Get the hex digest of the first entry for `algorithm`.
    ///
    /// The algorithm name is compared case-insensitively. The digest may not
    /// be valid hex.
    pub fn get_raw(&self, algorithm: &str) -> Option<&str> {
        self.iter().find_map(|entry| {
            let (name, digest) = entry.split_once(':')?;
            name.eq_ignore_ascii_case(algorithm).then_some(digest)
        })
    }

    /// Get the digest for `algorithm` decoded from hex.
    pub fn get<T>(&self, algorithm: &str) -> Result<Option<T>, T::Error>
    where
        T: FromHex,
    {
        self.get_raw(algorithm).map(T::from_hex).transpose()
    }
}
