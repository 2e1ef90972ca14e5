mod clients;
mod error;
mod models;

pub use self::{clients::*, error::*, models::*};

/// Operations the reconcilers need from the OVH API.
///
/// Fetches return `Ok(None)` when the provider answers "not found" - that's a
/// valid observation (the resource is absent), not a failure; every other
/// provider-side problem surfaces as an [`ApiError`].
pub trait BackupApi {
    fn backup_storage(&mut self, service: &ServiceName) -> ApiResult<Option<Payload>>;

    fn enable_backup_storage(&mut self, service: &ServiceName) -> ApiResult<Payload>;

    fn disable_backup_storage(&mut self, service: &ServiceName) -> ApiResult<Payload>;

    fn acl(&mut self, service: &ServiceName, ip: &IpBlock) -> ApiResult<Option<Payload>>;

    fn create_acl(
        &mut self,
        service: &ServiceName,
        ip: &IpBlock,
        permissions: Permissions,
    ) -> ApiResult<Payload>;

    fn replace_acl(
        &mut self,
        service: &ServiceName,
        ip: &IpBlock,
        permissions: Permissions,
    ) -> ApiResult<Payload>;

    fn delete_acl(&mut self, service: &ServiceName, ip: &IpBlock) -> ApiResult<Payload>;

    fn tasks(&mut self, service: &ServiceName, function: &str) -> ApiResult<Vec<TaskId>>;

    fn task(&mut self, service: &ServiceName, task: TaskId) -> ApiResult<Task>;
}
