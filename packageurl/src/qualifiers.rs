//! Specialized key-value collection for PURL qualifiers.

use std::cmp::Ordering;
use std::ops::{Deref, Index};
use std::slice;

use self::well_known::KnownQualifierKey;
use crate::{ParseError, SmallString};

pub mod well_known;

/// A list of qualifiers.
///
/// Internally, qualifiers are stored as a list of key-value pairs sorted by
/// key.
///
/// The keys are always valid qualifier names in their canonical format
/// (lowercase). Uppercase keys are automatically converted to lowercase and
/// lookups are case insensitive.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Qualifiers {
    qualifiers: Vec<(QualifierKey, SmallString)>,
}

impl Qualifiers {
    /// Try to construct a [`Qualifiers`] list from key-value pairs.
    ///
    /// If any of the keys is not a valid qualifier name,
    /// [`ParseError::InvalidQualifier`] will be returned.
    ///
    /// If the same key is repeated, the last value wins.
    pub fn try_from_iter<I, K, V>(items: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        SmallString: From<V>,
    {
        let items = items.into_iter();
        let mut this = Qualifiers::with_capacity(items.size_hint().0);
        for (key, value) in items {
            this.insert(key, value)?;
        }
        Ok(this)
    }

    /// Create an empty [`Qualifiers`] list with space for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { qualifiers: Vec::with_capacity(capacity) }
    }

    /// Iterate over the elements of the list in key order.
    pub fn iter(&self) -> Iter {
        Iter(self.qualifiers.iter())
    }

    /// Get the length of the list.
    pub fn len(&self) -> usize {
        self.qualifiers.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.qualifiers.is_empty()
    }

    /// Remove all elements from the list.
    pub fn clear(&mut self) {
        self.qualifiers.clear()
    }

    /// Get a qualifier by key.
    ///
    /// If the qualifier is not in the list, `None` is returned.
    pub fn get<K>(&self, key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        self.search(key.as_ref()).ok().map(|i| self.qualifiers[i].1.as_str())
    }

    /// Get a typed qualifier.
    ///
    /// If the qualifier is not in the list, `None` is returned.
    pub fn get_typed<'a, Q>(&'a self) -> Option<Q>
    where
        Q: From<&'a str> + KnownQualifierKey,
    {
        self.get(Q::KEY).map(Q::from)
    }

    fn search(&self, key: &str) -> Result<usize, usize> {
        self.qualifiers.binary_search_by(|(k, _)| k.cmp_ignore_case(key))
    }

    /// Check whether a qualifier with the given name exists.
    pub fn contains_key<K>(&self, key: K) -> bool
    where
        K: AsRef<str>,
    {
        self.search(key.as_ref()).is_ok()
    }

    /// Check whether a typed qualifier exists.
    pub fn contains_typed<Q>(&self) -> bool
    where
        Q: KnownQualifierKey,
    {
        self.contains_key(Q::KEY)
    }

    /// Set a qualifier.
    ///
    /// The previous value is returned if the key was already set.
    pub fn insert<K, V>(&mut self, key: K, v: V) -> Result<Option<SmallString>, ParseError>
    where
        K: AsRef<str>,
        SmallString: From<V>,
    {
        let key = QualifierKey::try_from(key.as_ref())?;
        let v = SmallString::from(v);
        match self.search(&key) {
            Ok(i) => Ok(Some(std::mem::replace(&mut self.qualifiers[i].1, v))),
            Err(i) => {
                self.qualifiers.insert(i, (key, v));
                Ok(None)
            },
        }
    }

    /// Set a typed qualifier.
    ///
    /// # Panics
    ///
    /// This method panics if the [`KnownQualifierKey::KEY`] is not a valid
    /// qualifier key.
    pub fn insert_typed<Q>(&mut self, value: Q)
    where
        Q: KnownQualifierKey,
        SmallString: From<Q>,
    {
        if let Err(error) = self.insert(Q::KEY, value) {
            panic!("Invalid well-known qualifier key {:?}: {error}", Q::KEY);
        }
    }

    /// Unset a qualifier.
    pub fn remove<S>(&mut self, key: S) -> Option<SmallString>
    where
        S: AsRef<str>,
    {
        let index = self.search(key.as_ref()).ok()?;
        Some(self.qualifiers.remove(index).1)
    }

    /// Unset a typed qualifier.
    pub fn remove_typed<Q>(&mut self)
    where
        Q: KnownQualifierKey,
    {
        self.remove(Q::KEY);
    }

    /// Retain only qualifiers that match the given predicate.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&QualifierKey, &str) -> bool,
    {
        self.qualifiers.retain(move |q| f(&q.0, &q.1));
    }
}

impl<'a> IntoIterator for &'a Qualifiers {
    type IntoIter = Iter<'a>;
    type Item = (&'a QualifierKey, &'a str);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A qualifier name.
///
/// The name is always stored in lower case. Comparisons between this type and
/// other strings are case insensitive.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct QualifierKey(SmallString);

impl QualifierKey {
    /// Get a reference to the lower case string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn cmp_ignore_case(&self, other: &str) -> Ordering {
        self.0.bytes().cmp(other.bytes().map(|b| b.to_ascii_lowercase()))
    }
}

impl TryFrom<&str> for QualifierKey {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if !is_valid_qualifier_name(value) {
            return Err(ParseError::InvalidQualifier);
        }
        let mut key = SmallString::from(value);
        key.make_ascii_lowercase();
        Ok(QualifierKey(key))
    }
}

impl PartialEq<str> for QualifierKey {
    fn eq(&self, other: &str) -> bool {
        self.cmp_ignore_case(other).is_eq()
    }
}

impl PartialEq<&str> for QualifierKey {
    fn eq(&self, other: &&str) -> bool {
        self.cmp_ignore_case(other).is_eq()
    }
}

impl Deref for QualifierKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for QualifierKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<QualifierKey> for SmallString {
    fn from(value: QualifierKey) -> Self {
        value.0
    }
}

/// An iterator over the qualifier key value pairs.
#[must_use]
pub struct Iter<'a>(slice::Iter<'a, (QualifierKey, SmallString)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a QualifierKey, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (k, v) = self.0.next()?;
        Some((k, v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (k, v) = self.0.next_back()?;
        Some((k, v.as_str()))
    }
}

/// Check a qualifier name, ignoring case.
///
/// The lowercase name must match `^[a-z0-9][a-z0-9._-]*$`, which also rules
/// out whitespace and percent-encoding.
fn is_valid_qualifier_name(k: &str) -> bool {
    // https://github.com/package-url/purl-spec/blob/master/PURL-SPECIFICATION.rst#rules-for-each-purl-component
    const ALLOWED_SPECIAL_CHARS: &[char] = &['.', '-', '_'];
    k.starts_with(|c: char| c.is_ascii_alphanumeric())
        && k.chars().all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
}

impl<K> Index<K> for Qualifiers
where
    K: AsRef<str>,
{
    type Output = str;

    fn index(&self, index: K) -> &Self::Output {
        let index = index.as_ref();
        let Some(value) = self.get(index) else {
            panic!("Qualifier {index:?} not found");
        };
        value
    }
}
