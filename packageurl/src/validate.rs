//! Type-agnostic validation of the parts of a PURL.
//!
//! These checks run for every package type, known or not, before the
//! [`crate::PurlShape`] gets to apply its own rules.

use crate::encoding::{contains_escape, is_relative_segment};
use crate::qualifiers::well_known::{Checksums, KnownQualifierKey};
use crate::{is_valid_package_type, ParseError, PurlField, PurlParts, SmallString};

impl PurlParts {
    /// Check the structural rules shared by all package types.
    ///
    /// Qualifiers with empty values are removed because they are the same as
    /// unset qualifiers. Empty `checksums` entries are removed first, so a
    /// list of only commas counts as empty. Qualifier keys are checked when
    /// they are inserted.
    pub(crate) fn validate(&mut self, package_type: &str) -> Result<(), ParseError> {
        if package_type.is_empty() {
            return Err(ParseError::MissingRequiredField(PurlField::PackageType));
        }
        if !is_valid_package_type(package_type) {
            return Err(ParseError::InvalidPackageType);
        }

        if self.name.is_empty() {
            return Err(ParseError::MissingRequiredField(PurlField::Name));
        }
        if contains_escape(&self.name) {
            return Err(ParseError::EncodedField(PurlField::Name));
        }

        if !self.namespace.is_empty() && self.namespace.split('/').any(str::is_empty) {
            return Err(ParseError::EmptySegment(PurlField::Namespace));
        }

        if contains_escape(&self.version) {
            return Err(ParseError::EncodedField(PurlField::Version));
        }

        let checksums = self.qualifiers.get(Checksums::KEY).map(Checksums::from);
        if let Some(checksums) = checksums {
            let cleaned = SmallString::from(checksums);
            self.qualifiers.insert(Checksums::KEY, cleaned)?;
        }
        self.qualifiers.retain(|_, v| !v.is_empty());

        if !self.subpath.is_empty() {
            for segment in self.subpath.split('/') {
                if segment.is_empty() {
                    return Err(ParseError::EmptySegment(PurlField::Subpath));
                }
                if is_relative_segment(segment) {
                    return Err(ParseError::RelativeSegment);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Qualifiers;

    fn parts(name: &str) -> PurlParts {
        PurlParts { name: name.into(), ..Default::default() }
    }

    #[test]
    fn validate_accepts_minimal_parts() {
        parts("name").validate("type").unwrap();
    }

    #[test]
    fn validate_requires_type() {
        let error = parts("name").validate("").unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::PackageType)));
    }

    #[test]
    fn validate_rejects_invalid_type() {
        for package_type in ["1abc", "a b", "a_b", "a%20"] {
            let error = parts("name").validate(package_type).unwrap_err();
            assert!(matches!(error, ParseError::InvalidPackageType), "{package_type}");
        }
    }

    #[test]
    fn validate_accepts_type_punctuation() {
        parts("name").validate("a.b+c-d").unwrap();
    }

    #[test]
    fn validate_requires_name() {
        let error = parts("").validate("type").unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::Name)));
    }

    #[test]
    fn validate_rejects_escaped_name() {
        let error = parts("a%2Fb").validate("type").unwrap_err();
        assert!(matches!(error, ParseError::EncodedField(PurlField::Name)));
    }

    #[test]
    fn validate_allows_literal_percent_in_name() {
        parts("100%").validate("type").unwrap();
    }

    #[test]
    fn validate_rejects_empty_namespace_segment() {
        for namespace in ["a//b", "/a", "a/"] {
            let mut parts = parts("name");
            parts.namespace = namespace.into();
            let error = parts.validate("type").unwrap_err();
            assert!(matches!(error, ParseError::EmptySegment(PurlField::Namespace)), "{namespace}");
        }
    }

    #[test]
    fn validate_allows_relative_namespace_segments() {
        let mut parts = parts("name");
        parts.namespace = "a/./../b".into();
        parts.validate("type").unwrap();
    }

    #[test]
    fn validate_rejects_escaped_version() {
        let mut parts = parts("name");
        parts.version = "1.0%2B1".into();
        let error = parts.validate("type").unwrap_err();
        assert!(matches!(error, ParseError::EncodedField(PurlField::Version)));
    }

    #[test]
    fn validate_drops_empty_qualifiers() {
        let mut parts = parts("name");
        parts.qualifiers = Qualifiers::try_from_iter([("a", ""), ("b", "1")]).unwrap();
        parts.validate("type").unwrap();
        assert!(!parts.qualifiers.contains_key("a"));
        assert_eq!(Some("1"), parts.qualifiers.get("b"));
    }

    #[test]
    fn validate_drops_empty_checksums_entries() {
        let mut parts = parts("name");
        parts.qualifiers =
            Qualifiers::try_from_iter([("checksums", "sha1:ab,,md5:cd,"), ("other", ",")]).unwrap();
        parts.validate("type").unwrap();
        assert_eq!(Some("sha1:ab,md5:cd"), parts.qualifiers.get("checksums"));
        assert_eq!(Some(","), parts.qualifiers.get("other"));
    }

    #[test]
    fn validate_drops_checksums_without_entries() {
        let mut parts = parts("name");
        parts.qualifiers = Qualifiers::try_from_iter([("checksums", ",,")]).unwrap();
        parts.validate("type").unwrap();
        assert!(parts.qualifiers.is_empty());
    }

    #[test]
    fn validate_rejects_relative_subpath_segments() {
        for subpath in ["a/./b", "..", "a/.."] {
            let mut parts = parts("name");
            parts.subpath = subpath.into();
            let error = parts.validate("type").unwrap_err();
            assert!(matches!(error, ParseError::RelativeSegment), "{subpath}");
        }
    }

    #[test]
    fn validate_rejects_empty_subpath_segments() {
        let mut parts = parts("name");
        parts.subpath = "a//b".into();
        let error = parts.validate("type").unwrap_err();
        assert!(matches!(error, ParseError::EmptySegment(PurlField::Subpath)));
    }
}
