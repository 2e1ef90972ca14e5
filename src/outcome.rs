use crate::prelude::*;
use serde::Serialize;

/// What a reconciliation reports back: whether anything changed, a
/// human-readable message and whatever attributes the provider returned for
/// the touched resource, merged in verbatim.
#[derive(Clone, Debug, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Outcome {
    pub changed: bool,
    pub message: String,

    #[serde(flatten)]
    pub attributes: Payload,
}

impl Outcome {
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
            attributes: Default::default(),
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
            attributes: Default::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: Payload) -> Self {
        self.attributes = attributes;
        self
    }
}
