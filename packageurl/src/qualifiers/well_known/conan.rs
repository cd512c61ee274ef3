//! Known qualifier types for [conan].
//!
//! [conan]: https://github.com/package-url/purl-spec/blob/master/PURL-TYPES.rst#conan

use super::str_ref_qualifier;

str_ref_qualifier!(Channel, "channel", "channel");
