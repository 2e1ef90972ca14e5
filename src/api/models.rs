mod ip_block;
mod permissions;
mod service_name;
mod task;

pub use self::{ip_block::*, permissions::*, service_name::*, task::*};

/// Opaque attributes the provider returns for a resource; the reconcilers
/// never look inside, they only pass them through to the caller.
pub type Payload = serde_json::Map<String, serde_json::Value>;
