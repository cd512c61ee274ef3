use crate::encoding::is_relative_segment;
use crate::qualifiers::well_known::KnownQualifierKey;
use crate::{GenericPurl, ParseError, PurlParts, PurlShape, SmallString};

/// A mutable, potentially invalid PURL.
///
/// This type is used while parsing or constructing PURLs.
/// [`GenericPurlBuilder::build`] converts the builder into an immutable,
/// validated PURL.
///
/// # Example
///
/// ```
/// use packageurl::GenericPurlBuilder;
///
/// // Use the builder if you want to set fields besides the type and name.
/// let purl = GenericPurlBuilder::new(String::from("maven"), "my-package")
///     .with_namespace("my.company")
///     .build()
///     .unwrap();
///
/// assert_eq!("pkg:maven/my.company/my-package", &purl.to_string());
/// ```
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct GenericPurlBuilder<T> {
    /// The package type.
    pub package_type: T,
    /// The type-specific parts that make up the PURL.
    pub parts: PurlParts,
}

impl<T> GenericPurlBuilder<T> {
    /// Initialize a new PURL builder.
    pub fn new<S>(package_type: T, name: S) -> Self
    where
        SmallString: From<S>,
    {
        Self {
            package_type,
            parts: PurlParts { name: SmallString::from(name), ..Default::default() },
        }
    }

    /// Set the package type.
    pub fn with_package_type(mut self, new: T) -> Self {
        self.package_type = new;
        self
    }

    /// Set the namespace.
    ///
    /// Passing `""` unsets the namespace.
    pub fn with_namespace<S>(mut self, new: S) -> Self
    where
        SmallString: From<S>,
    {
        self.parts.namespace = SmallString::from(new);
        self
    }

    /// Unset the namespace.
    ///
    /// This is the same as passing `""` to [`Self::with_namespace`].
    pub fn without_namespace(mut self) -> Self {
        self.parts.namespace = Default::default();
        self
    }

    /// Set the name.
    pub fn with_name<S>(mut self, new: S) -> Self
    where
        SmallString: From<S>,
    {
        self.parts.name = SmallString::from(new);
        self
    }

    /// Set the version.
    ///
    /// Passing `""` unsets the version.
    pub fn with_version<S>(mut self, new: S) -> Self
    where
        SmallString: From<S>,
    {
        self.parts.version = SmallString::from(new);
        self
    }

    /// Unset the version.
    ///
    /// This is the same as passing `""` to [`Self::with_version`].
    pub fn without_version(mut self) -> Self {
        self.parts.version = Default::default();
        self
    }

    /// Set a qualifier.
    ///
    /// If `v` is `""`, the qualifier will be dropped when the PURL is built.
    pub fn with_qualifier<K, V>(mut self, k: K, v: V) -> Result<Self, ParseError>
    where
        K: AsRef<str>,
        SmallString: From<V>,
    {
        self.parts.qualifiers.insert(k, v)?;
        Ok(self)
    }

    /// Set a qualifier.
    ///
    /// If `v` is `None`, the qualifier will be unset.
    pub fn with_typed_qualifier<Q>(mut self, v: Option<Q>) -> Self
    where
        Q: KnownQualifierKey,
        SmallString: From<Q>,
    {
        match v {
            Some(v) => {
                self.parts.qualifiers.insert_typed(v);
            },
            None => {
                self.parts.qualifiers.remove_typed::<Q>();
            },
        }
        self
    }

    /// Unset a qualifier.
    pub fn without_qualifier<S>(mut self, k: S) -> Self
    where
        S: AsRef<str>,
    {
        self.parts.qualifiers.remove(k);
        self
    }

    /// Unset all qualifiers.
    pub fn without_qualifiers(mut self) -> Self {
        self.parts.qualifiers.clear();
        self
    }

    /// Set the subpath.
    ///
    /// Empty, `.` and `..` segments are removed. Passing `""` will unset the
    /// subpath.
    pub fn with_subpath<S>(mut self, new: S) -> Self
    where
        SmallString: From<S>,
    {
        let new = SmallString::from(new);

        let is_dropped = |segment: &str| segment.is_empty() || is_relative_segment(segment);
        let new = if new.split('/').any(is_dropped) {
            let mut cleaned = SmallString::new();
            for segment in new.split('/').filter(|segment| !is_dropped(segment)) {
                if !cleaned.is_empty() {
                    cleaned.push('/');
                }
                cleaned.push_str(segment);
            }
            cleaned
        } else {
            new
        };

        self.parts.subpath = new;
        self
    }

    /// Unset the subpath.
    ///
    /// This is the same as passing `""` to [`Self::with_subpath`].
    pub fn without_subpath(mut self) -> Self {
        self.parts.subpath = Default::default();
        self
    }

    /// Convert the PURL builder into a PURL.
    ///
    /// The type-agnostic rules are checked first. Then [`PurlShape::finish`]
    /// is called on `T` to apply normalization and validation rules for the
    /// package type. Building a PURL that came from [`GenericPurl::into_builder`]
    /// gives back the same PURL.
    pub fn build(mut self) -> Result<GenericPurl<T>, <T as PurlShape>::Error>
    where
        T: PurlShape,
    {
        let checked = {
            let package_type = self.package_type.package_type();
            self.parts.validate(&package_type).map_err(|error| {
                tracing::debug!(package_type = %package_type, %error, "Rejected PURL");
                error
            })
        };
        checked?;

        self.package_type.finish(&mut self.parts)?;

        let GenericPurlBuilder { package_type, parts } = self;

        Ok(GenericPurl { package_type, parts })
    }
}
