mod ensure_acl;
mod ensure_storage;

pub use self::{ensure_acl::*, ensure_storage::*};

use clap::ValueEnum;
use std::fmt;

/// State a resource should end up in; the observed state is whatever the
/// provider reports, and a reconciliation's job is to make them agree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
        .fmt(f)
    }
}

#[cfg(test)]
#[macro_export]
macro_rules! assert_out {
    ($expected:literal, $actual:expr) => {
        pa::assert_str_eq!(indoc::indoc!($expected), String::from_utf8_lossy(&$actual));
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! assert_err {
    ($expected:literal, $actual:expr) => {
        let actual = format!("{:?}", $actual.unwrap_err());

        pa::assert_str_eq!(indoc::indoc!($expected).trim(), actual);
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! assert_api {
    ($expected:literal, $actual:expr) => {
        pa::assert_str_eq!(indoc::indoc!($expected), $actual.to_string());
    };
}
