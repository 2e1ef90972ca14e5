mod http;

#[cfg(test)]
mod fake;

pub use self::http::*;

#[cfg(test)]
pub use self::fake::*;
