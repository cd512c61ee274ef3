//! A borrowed view of a PURL's fields.

use std::borrow::Cow;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::qualifiers::well_known::{Checksums, KnownQualifierKey};
use crate::{GenericPurl, PurlShape};

/// The fields of a PURL, with unset fields as `None`.
///
/// Values are decoded. With the `serde` feature this serializes as a map
/// keyed by the field names of the PURL spec, which is what test suites and
/// tooling usually compare against.
///
/// # Example
///
/// ```
/// use std::str::FromStr;
///
/// use packageurl::{GenericPurl, QualifierValue};
///
/// let purl = GenericPurl::<String>::from_str("pkg:type/name?checksums=sha1:00,md5:11").unwrap();
/// let fields = purl.to_fields();
/// assert_eq!("type", fields.package_type);
/// assert_eq!(None, fields.namespace);
/// assert_eq!(
///     Some(&QualifierValue::List(vec!["sha1:00", "md5:11"])),
///     fields.qualifiers.as_ref().and_then(|q| q.get("checksums")),
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PurlFields<'a> {
    /// Always `pkg`.
    pub scheme: &'static str,
    /// The package type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub package_type: Cow<'a, str>,
    /// The namespace, with segments joined by `/`.
    pub namespace: Option<&'a str>,
    /// The name.
    pub name: &'a str,
    /// The version.
    pub version: Option<&'a str>,
    /// The qualifiers, or `None` if there are none.
    pub qualifiers: Option<BTreeMap<&'a str, QualifierValue<'a>>>,
    /// The subpath, with segments joined by `/`.
    pub subpath: Option<&'a str>,
}

/// The value of a qualifier in [`PurlFields`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum QualifierValue<'a> {
    /// A plain string.
    Single(&'a str),
    /// The entries of a list-valued qualifier like `checksums`.
    List(Vec<&'a str>),
}

impl<T> GenericPurl<T>
where
    T: PurlShape,
{
    /// Get a borrowed view of all of the fields.
    pub fn to_fields(&self) -> PurlFields<'_> {
        let qualifiers: BTreeMap<_, _> = self
            .qualifiers()
            .iter()
            .map(|(k, v)| {
                let value = if *k == Checksums::KEY {
                    QualifierValue::List(v.split(',').filter(|e| !e.is_empty()).collect())
                } else {
                    QualifierValue::Single(v)
                };
                (k.as_str(), value)
            })
            .filter(|(_, value)| match value {
                QualifierValue::Single(v) => !v.is_empty(),
                QualifierValue::List(entries) => !entries.is_empty(),
            })
            .collect();

        PurlFields {
            scheme: self.scheme(),
            package_type: self.package_type().package_type(),
            namespace: self.namespace(),
            name: self.name(),
            version: self.version(),
            qualifiers: Some(qualifiers).filter(|q| !q.is_empty()),
            subpath: self.subpath(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use maplit::btreemap;

    use super::*;

    #[test]
    fn to_fields_when_minimal_leaves_optional_fields_unset() {
        let purl = GenericPurl::<String>::from_str("pkg:gem/ruby-advisory-db-check@0.12.4").unwrap();
        assert_eq!(
            PurlFields {
                scheme: "pkg",
                package_type: Cow::Borrowed("gem"),
                namespace: None,
                name: "ruby-advisory-db-check",
                version: Some("0.12.4"),
                qualifiers: None,
                subpath: None,
            },
            purl.to_fields(),
        );
    }

    #[test]
    fn to_fields_includes_decoded_values() {
        let purl = GenericPurl::<String>::from_str(
            "pkg:type/%40ns/name@1.0?arch=i386&distro=fedora-25#sub/path%20x",
        )
        .unwrap();
        let fields = purl.to_fields();
        assert_eq!(Some("@ns"), fields.namespace);
        assert_eq!(Some("sub/path x"), fields.subpath);
        assert_eq!(
            Some(btreemap! {
                "arch" => QualifierValue::Single("i386"),
                "distro" => QualifierValue::Single("fedora-25"),
            }),
            fields.qualifiers,
        );
    }

    #[test]
    fn to_fields_splits_checksums() {
        let purl = GenericPurl::<String>::from_str("pkg:type/name?checksums=sha1:00").unwrap();
        assert_eq!(
            Some(btreemap! { "checksums" => QualifierValue::List(vec!["sha1:00"]) }),
            purl.to_fields().qualifiers,
        );
    }

    #[test]
    fn to_fields_skips_empty_checksums_entries() {
        let purl =
            GenericPurl::<String>::from_str("pkg:type/name?checksums=sha1:ab,,md5:cd,").unwrap();
        assert_eq!(
            Some(btreemap! { "checksums" => QualifierValue::List(vec!["sha1:ab", "md5:cd"]) }),
            purl.to_fields().qualifiers,
        );
        assert_eq!("pkg:type/name?checksums=sha1:ab,md5:cd", purl.to_string());
    }

    #[test]
    fn to_fields_when_checksums_are_only_commas_has_no_qualifiers() {
        let purl = GenericPurl::<String>::from_str("pkg:type/name?checksums=%2C").unwrap();
        assert!(purl.qualifiers().is_empty());
        assert_eq!(None, purl.to_fields().qualifiers);
        assert_eq!("pkg:type/name", purl.to_string());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn to_fields_serializes_with_spec_field_names() {
        let purl = GenericPurl::<String>::from_str("pkg:type/ns/name?a=b&checksums=x,y").unwrap();
        assert_eq!(
            serde_json::json!({
                "scheme": "pkg",
                "type": "type",
                "namespace": "ns",
                "name": "name",
                "version": null,
                "qualifiers": { "a": "b", "checksums": ["x", "y"] },
                "subpath": null,
            }),
            serde_json::to_value(purl.to_fields()).unwrap(),
        );
    }
}
