//! Conformance tests for `packageurl`.
//!
//! Each test checks that a PURL parses into the expected components, that
//! formatting it gives the canonical string, and that the canonical string
//! parses back into the same PURL. Invalid PURLs must be rejected.
