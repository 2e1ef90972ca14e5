use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// An ACL's IP block in CIDR notation, e.g. `192.0.2.0/24`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IpBlock(String);

// Everything but unreserved characters gets encoded; in particular the mask's
// `/` must become `%2F`, otherwise the provider routes the request to the
// wrong resource
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

impl IpBlock {
    pub fn new(block: impl AsRef<str>) -> Self {
        Self(block.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encodes the block for use as a single path segment of an URL.
    pub fn path_segment(&self) -> String {
        utf8_percent_encode(&self.0, SEGMENT).to_string()
    }
}

impl fmt::Display for IpBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
