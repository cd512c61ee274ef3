//! Support for converting a PURL to a string.

use std::fmt;

use crate::encoding::{encode, is_relative_segment, segments};
use crate::qualifiers::well_known::{Checksums, KnownQualifierKey};
use crate::{is_valid_package_type, GenericPurl, PurlShape, SCHEME};

impl<T> fmt::Display for GenericPurl<T>
where
    T: PurlShape,
{
    /// Write the canonical form of the PURL.
    ///
    /// # Panics
    ///
    /// Panics if the [`PurlShape`] returns an invalid package type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package_type = self.package_type().package_type();

        if !is_valid_package_type(&package_type) {
            panic!("Invalid package type {:?}", &*package_type);
        }

        // The type is never encoded. It was validated above so there's nothing
        // that would need to be.
        write!(f, "{}:{}/", SCHEME, package_type)?;

        if let Some(namespace) = self.namespace() {
            write_segments(f, namespace, |segment| !segment.is_empty())?;
            write!(f, "/{}", encode(self.name().trim_matches('/')))?;
        } else {
            write!(f, "{}", encode(self.name()))?;
        }

        if let Some(version) = self.version() {
            write!(f, "@{}", encode(version))?;
        }

        let mut qualifiers: Vec<String> = self
            .qualifiers()
            .iter()
            .filter_map(|(k, v)| {
                let value = if *k == Checksums::KEY {
                    let items: Vec<String> =
                        Checksums::from(v).iter().map(|item| encode(item).to_string()).collect();
                    items.join(",")
                } else {
                    encode(v).to_string()
                };
                // Empty values are the same as unset qualifiers.
                (!value.is_empty()).then(|| format!("{}={}", k.as_str(), value))
            })
            .collect();
        if !qualifiers.is_empty() {
            // Sorted by the rendered pair, not by key.
            qualifiers.sort_unstable();
            write!(f, "?{}", qualifiers.join("&"))?;
        }

        if let Some(subpath) = self.subpath() {
            let keep = |segment: &str| !segment.is_empty() && !is_relative_segment(segment);
            if segments(subpath).any(keep) {
                f.write_str("#")?;
                write_segments(f, subpath, keep)?;
            }
        }

        Ok(())
    }
}

/// Write the segments of `path` that pass `keep`, encoded and joined by `/`.
fn write_segments(
    f: &mut fmt::Formatter<'_>,
    path: &str,
    keep: impl Fn(&str) -> bool,
) -> fmt::Result {
    let mut separator = "";
    for segment in segments(path).filter(|segment| keep(segment)) {
        write!(f, "{}{}", separator, encode(segment))?;
        separator = "/";
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod ser {
    use serde::Serialize;

    use super::*;

    impl<T> Serialize for GenericPurl<T>
    where
        T: PurlShape,
    {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.collect_str(self)
        }
    }
}
