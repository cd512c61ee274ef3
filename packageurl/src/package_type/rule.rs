//! The normalization and validation rules of the known package types.

use crate::qualifiers::well_known::conan::Channel;
use crate::qualifiers::well_known::KnownQualifierKey;
use crate::{lowercase_in_place, ParseError, PurlField, PurlParts, SmallString};

/// A field that a [`TypeRule`] applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Part {
    Namespace,
    Name,
    Version,
}

impl Part {
    fn field(self) -> PurlField {
        match self {
            Part::Namespace => PurlField::Namespace,
            Part::Name => PurlField::Name,
            Part::Version => PurlField::Version,
        }
    }

    fn get(self, parts: &PurlParts) -> &SmallString {
        match self {
            Part::Namespace => &parts.namespace,
            Part::Name => &parts.name,
            Part::Version => &parts.version,
        }
    }

    fn get_mut(self, parts: &mut PurlParts) -> &mut SmallString {
        match self {
            Part::Namespace => &mut parts.namespace,
            Part::Name => &mut parts.name,
            Part::Version => &mut parts.version,
        }
    }
}

/// One step of a package type's rules.
///
/// Rules run in order and stop at the first error, so normalizing rules
/// should come before the checks that depend on them.
#[derive(Clone, Copy)]
pub(super) enum TypeRule {
    /// Convert the part to lowercase.
    Lowercase(Part),
    /// Replace every `from` in the part with `to`.
    Replace { part: Part, from: char, to: char },
    /// The part must be unset.
    Forbid(Part),
    /// The part must be set.
    Require(Part),
    /// The name must pass `check`.
    Name { check: fn(&str) -> bool, reason: &'static str },
    /// The part must not have more than `max` `/`-separated segments.
    MaxSegments { part: Part, max: usize },
    /// The part and the qualifier must either both be set or both be unset.
    PairedWithQualifier { part: Part, qualifier: &'static str },
}

impl TypeRule {
    pub(super) fn apply(&self, parts: &mut PurlParts) -> Result<(), ParseError> {
        match *self {
            TypeRule::Lowercase(part) => lowercase_in_place(part.get_mut(parts)),
            TypeRule::Replace { part, from, to } => {
                let value = part.get_mut(parts);
                if value.contains(from) {
                    *value = SmallString::from(value.replace(from, &to.to_string()));
                }
            },
            TypeRule::Forbid(part) => {
                if !part.get(parts).is_empty() {
                    return Err(ParseError::FieldNotAllowed(part.field()));
                }
            },
            TypeRule::Require(part) => {
                if part.get(parts).is_empty() {
                    return Err(ParseError::MissingRequiredField(part.field()));
                }
            },
            TypeRule::Name { check, reason } => {
                if !check(&parts.name) {
                    return Err(ParseError::InvalidName(reason));
                }
            },
            TypeRule::MaxSegments { part, max } => {
                let value = part.get(parts);
                if !value.is_empty() && value.split('/').count() > max {
                    return Err(ParseError::TooManySegments { field: part.field(), max });
                }
            },
            TypeRule::PairedWithQualifier { part, qualifier } => {
                let has_part = !part.get(parts).is_empty();
                if has_part != parts.qualifiers.contains_key(qualifier) {
                    return Err(ParseError::UnpairedQualifier { field: part.field(), qualifier });
                }
            },
        }
        Ok(())
    }
}

pub(super) const LOWERCASE_NAMESPACE_AND_NAME: &[TypeRule] =
    &[TypeRule::Lowercase(Part::Namespace), TypeRule::Lowercase(Part::Name)];

pub(super) const RPM: &[TypeRule] = &[TypeRule::Lowercase(Part::Namespace)];

pub(super) const NPM: &[TypeRule] = &[TypeRule::Lowercase(Part::Name)];

pub(super) const PYPI: &[TypeRule] = &[
    TypeRule::Lowercase(Part::Name),
    TypeRule::Replace { part: Part::Name, from: '_', to: '-' },
];

pub(super) const OCI: &[TypeRule] =
    &[TypeRule::Lowercase(Part::Name), TypeRule::Forbid(Part::Namespace)];

pub(super) const NUGET: &[TypeRule] = &[TypeRule::Forbid(Part::Namespace)];

pub(super) const COCOAPODS: &[TypeRule] = &[TypeRule::Name {
    check: is_cocoapods_name,
    reason: "must not contain whitespace or '+', or start with '.'",
}];

pub(super) const CONAN: &[TypeRule] = &[TypeRule::PairedWithQualifier {
    part: Part::Namespace,
    qualifier: <Channel<'static>>::KEY,
}];

pub(super) const CRAN: &[TypeRule] = &[TypeRule::Require(Part::Version)];

pub(super) const HACKAGE: &[TypeRule] = &[TypeRule::Name {
    check: is_hackage_name,
    reason: "must only contain ASCII letters, digits and '-'",
}];

pub(super) const PUB: &[TypeRule] = &[
    TypeRule::Lowercase(Part::Name),
    TypeRule::Name { check: is_pub_name, reason: "must only contain [a-z0-9_]" },
];

pub(super) const SWID: &[TypeRule] = &[TypeRule::MaxSegments { part: Part::Namespace, max: 2 }];

pub(super) const SWIFT: &[TypeRule] =
    &[TypeRule::Require(Part::Namespace), TypeRule::Require(Part::Version)];

fn is_cocoapods_name(name: &str) -> bool {
    !name.starts_with('.') && !name.contains(|c: char| c.is_whitespace() || c == '+')
}

fn is_hackage_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_pub_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Qualifiers;

    fn parts(namespace: &str, name: &str, version: &str) -> PurlParts {
        PurlParts {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    #[test]
    fn lowercase_changes_only_its_part() {
        let mut parts = parts("NS", "Name", "V1");
        TypeRule::Lowercase(Part::Name).apply(&mut parts).unwrap();
        assert_eq!("NS", &parts.namespace);
        assert_eq!("name", &parts.name);
        assert_eq!("V1", &parts.version);
    }

    #[test]
    fn replace_replaces_every_match() {
        let mut parts = parts("", "a_b_c", "");
        TypeRule::Replace { part: Part::Name, from: '_', to: '-' }.apply(&mut parts).unwrap();
        assert_eq!("a-b-c", &parts.name);
    }

    #[test]
    fn forbid_when_set_returns_error() {
        let error = TypeRule::Forbid(Part::Version).apply(&mut parts("", "n", "1")).unwrap_err();
        assert!(matches!(error, ParseError::FieldNotAllowed(PurlField::Version)));
        TypeRule::Forbid(Part::Version).apply(&mut parts("", "n", "")).unwrap();
    }

    #[test]
    fn require_when_unset_returns_error() {
        let error = TypeRule::Require(Part::Namespace).apply(&mut parts("", "n", "")).unwrap_err();
        assert!(matches!(error, ParseError::MissingRequiredField(PurlField::Namespace)));
    }

    #[test]
    fn name_reports_reason() {
        let rule = TypeRule::Name { check: |_| false, reason: "is never valid" };
        let error = rule.apply(&mut parts("", "n", "")).unwrap_err();
        assert_eq!("name is never valid", error.to_string());
    }

    #[test]
    fn max_segments_ignores_unset_part() {
        let rule = TypeRule::MaxSegments { part: Part::Namespace, max: 1 };
        rule.apply(&mut parts("", "n", "")).unwrap();
        rule.apply(&mut parts("a", "n", "")).unwrap();
        assert!(rule.apply(&mut parts("a/b", "n", "")).is_err());
    }

    #[test]
    fn paired_with_qualifier_compares_presence() {
        let rule = TypeRule::PairedWithQualifier { part: Part::Version, qualifier: "q" };
        rule.apply(&mut parts("", "n", "")).unwrap();

        let mut both = parts("", "n", "1");
        both.qualifiers = Qualifiers::try_from_iter([("Q", "x")]).unwrap();
        rule.apply(&mut both).unwrap();

        assert!(rule.apply(&mut parts("", "n", "1")).is_err());
    }

    #[test]
    fn name_checks() {
        assert!(is_cocoapods_name("MapsIndoors"));
        assert!(!is_cocoapods_name("a\tb"));
        assert!(is_hackage_name("Cabal-3"));
        assert!(!is_hackage_name("a.b"));
        assert!(is_pub_name("flutter_test"));
        assert!(!is_pub_name("Flutter"));
    }
}
