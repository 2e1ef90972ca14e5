use crate::api::*;
use serde_json::json;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;

/// In-memory stand-in for the OVH API.
///
/// Task statuses are scripted: each poll of a task consumes the next status
/// from its queue, the last one sticks.
#[derive(Debug, Default)]
pub struct FakeApi {
    storages: BTreeMap<ServiceName, Payload>,
    acls: BTreeMap<FakeAclId, Permissions>,
    tasks: BTreeMap<FakeTaskId, FakeTaskState>,
    errors: HashSet<FakeError>,
}

impl FakeApi {
    pub fn add_storage(&mut self, storage: FakeStorage<'_>) {
        self.storages
            .insert(ServiceName::new(storage.service), storage.attributes);
    }

    pub fn add_acl(&mut self, acl: FakeAcl<'_>) {
        self.acls.insert(
            FakeAclId {
                service: ServiceName::new(acl.service),
                ip: IpBlock::new(acl.ip),
            },
            acl.permissions,
        );
    }

    pub fn add_task(&mut self, task: FakeTask<'_>) {
        self.tasks.insert(
            FakeTaskId {
                service: ServiceName::new(task.service),
                id: TaskId::new(task.id),
            },
            FakeTaskState {
                function: task.function.into(),
                comment: task.comment.into(),
                statuses: task.statuses.iter().map(|status| status.to_string()).collect(),
            },
        );
    }

    pub fn inject_error(&mut self, error: FakeError) {
        self.errors.insert(error);
    }

    fn fail_on(&self, error: &FakeError) -> ApiResult<()> {
        if self.errors.contains(error) {
            Err(ApiError::InjectedError)
        } else {
            Ok(())
        }
    }

    fn acl_payload(id: &FakeAclId, permissions: Permissions) -> Payload {
        json!({
            "ipBlock": id.ip.as_str(),
            "cifs": permissions.cifs,
            "ftp": permissions.ftp,
            "nfs": permissions.nfs,
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn not_found(what: impl fmt::Display) -> ApiError {
        ApiError::Call {
            status: 404,
            message: format!("The requested object ({}) does not exist", what),
        }
    }
}

impl BackupApi for FakeApi {
    fn backup_storage(&mut self, service: &ServiceName) -> ApiResult<Option<Payload>> {
        self.fail_on(&FakeError::OnBackupStorage {
            service: service.as_str().into(),
        })?;

        Ok(self.storages.get(service).cloned())
    }

    fn enable_backup_storage(&mut self, service: &ServiceName) -> ApiResult<Payload> {
        self.fail_on(&FakeError::OnEnableBackupStorage {
            service: service.as_str().into(),
        })?;

        if self.storages.contains_key(service) {
            return Err(ApiError::Call {
                status: 409,
                message: format!("Backup storage is already active on {}", service),
            });
        }

        let payload = Payload::default();

        self.storages.insert(service.clone(), payload.clone());

        Ok(payload)
    }

    fn disable_backup_storage(&mut self, service: &ServiceName) -> ApiResult<Payload> {
        self.fail_on(&FakeError::OnDisableBackupStorage {
            service: service.as_str().into(),
        })?;

        self.storages
            .remove(service)
            .ok_or_else(|| Self::not_found(service))
    }

    fn acl(&mut self, service: &ServiceName, ip: &IpBlock) -> ApiResult<Option<Payload>> {
        self.fail_on(&FakeError::OnAcl {
            service: service.as_str().into(),
            ip: ip.as_str().into(),
        })?;

        let id = FakeAclId {
            service: service.clone(),
            ip: ip.clone(),
        };

        Ok(self
            .acls
            .get(&id)
            .map(|&permissions| Self::acl_payload(&id, permissions)))
    }

    fn create_acl(
        &mut self,
        service: &ServiceName,
        ip: &IpBlock,
        permissions: Permissions,
    ) -> ApiResult<Payload> {
        self.fail_on(&FakeError::OnCreateAcl {
            service: service.as_str().into(),
            ip: ip.as_str().into(),
        })?;

        let id = FakeAclId {
            service: service.clone(),
            ip: ip.clone(),
        };

        if self.acls.contains_key(&id) {
            return Err(ApiError::Call {
                status: 409,
                message: format!("An ACL for {} already exists on {}", ip, service),
            });
        }

        self.acls.insert(id.clone(), permissions);

        Ok(Self::acl_payload(&id, permissions))
    }

    fn replace_acl(
        &mut self,
        service: &ServiceName,
        ip: &IpBlock,
        permissions: Permissions,
    ) -> ApiResult<Payload> {
        self.fail_on(&FakeError::OnReplaceAcl {
            service: service.as_str().into(),
            ip: ip.as_str().into(),
        })?;

        let id = FakeAclId {
            service: service.clone(),
            ip: ip.clone(),
        };

        let entry = self
            .acls
            .get_mut(&id)
            .ok_or_else(|| Self::not_found(&id))?;

        *entry = permissions;

        // The real API answers `null` here
        Ok(Payload::default())
    }

    fn delete_acl(&mut self, service: &ServiceName, ip: &IpBlock) -> ApiResult<Payload> {
        self.fail_on(&FakeError::OnDeleteAcl {
            service: service.as_str().into(),
            ip: ip.as_str().into(),
        })?;

        let id = FakeAclId {
            service: service.clone(),
            ip: ip.clone(),
        };

        self.acls
            .remove(&id)
            .ok_or_else(|| Self::not_found(&id))?;

        Ok(Payload::default())
    }

    fn tasks(&mut self, service: &ServiceName, function: &str) -> ApiResult<Vec<TaskId>> {
        self.fail_on(&FakeError::OnTasks {
            service: service.as_str().into(),
        })?;

        Ok(self
            .tasks
            .iter()
            .filter(|(id, state)| &id.service == service && state.function == function)
            .map(|(id, _)| id.id)
            .collect())
    }

    fn task(&mut self, service: &ServiceName, task: TaskId) -> ApiResult<Task> {
        self.fail_on(&FakeError::OnTask {
            service: service.as_str().into(),
        })?;

        let id = FakeTaskId {
            service: service.clone(),
            id: task,
        };

        let state = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| Self::not_found(format!("task {}", task)))?;

        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front().unwrap()
        } else {
            state.statuses.front().cloned().unwrap_or_default()
        };

        Ok(Task {
            task_id: task,
            function: state.function.clone(),
            status,
            comment: state.comment.clone(),
            start_date: None,
            done_date: None,
            last_update: None,
        })
    }
}

impl fmt::Display for FakeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (service, attributes) in &self.storages {
            if attributes.is_empty() {
                writeln!(f, "{}: backup storage", service)?;
            } else {
                writeln!(
                    f,
                    "{}: backup storage {}",
                    service,
                    serde_json::Value::Object(attributes.clone()),
                )?;
            }
        }

        for (id, permissions) in &self.acls {
            writeln!(f, "{}: acl {} ({})", id.service, id.ip, permissions)?;
        }

        for (id, state) in &self.tasks {
            writeln!(
                f,
                "{}: task {} [{}] {}",
                id.service,
                id.id,
                state.function,
                state.statuses.front().map(String::as_str).unwrap_or(""),
            )?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FakeAclId {
    service: ServiceName,
    ip: IpBlock,
}

impl fmt::Display for FakeAclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.ip)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FakeTaskId {
    service: ServiceName,
    id: TaskId,
}

#[derive(Clone, Debug)]
struct FakeTaskState {
    function: String,
    comment: String,
    statuses: VecDeque<String>,
}

#[derive(Clone, Debug)]
pub struct FakeStorage<'a> {
    pub service: &'a str,
    pub attributes: Payload,
}

impl Default for FakeStorage<'static> {
    fn default() -> Self {
        Self {
            service: "ns12345",
            attributes: Default::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FakeAcl<'a> {
    pub service: &'a str,
    pub ip: &'a str,
    pub permissions: Permissions,
}

impl Default for FakeAcl<'static> {
    fn default() -> Self {
        Self {
            service: "ns12345",
            ip: "192.0.2.0/24",
            permissions: Default::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FakeTask<'a> {
    pub service: &'a str,
    pub id: i64,
    pub function: &'a str,
    pub comment: &'a str,
    pub statuses: &'a [&'a str],
}

impl Default for FakeTask<'static> {
    fn default() -> Self {
        Self {
            service: "ns12345",
            id: 1,
            function: ACTIVATION_FUNCTION,
            comment: "",
            statuses: &["done"],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FakeError {
    OnBackupStorage { service: String },
    OnEnableBackupStorage { service: String },
    OnDisableBackupStorage { service: String },
    OnAcl { service: String, ip: String },
    OnCreateAcl { service: String, ip: String },
    OnReplaceAcl { service: String, ip: String },
    OnDeleteAcl { service: String, ip: String },
    OnTasks { service: String },
    OnTask { service: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::utils::*;
    use pretty_assertions as pa;
    use serde_json::json;

    fn api() -> FakeApi {
        let mut api = FakeApi::default();

        api.add_storage(FakeStorage {
            service: "ns11111",
            attributes: payload(json!({ "quota": 500 })),
        });

        api.add_acl(FakeAcl {
            service: "ns11111",
            ip: "192.0.2.0/24",
            permissions: Permissions {
                ftp: true,
                ..Default::default()
            },
        });

        api.add_task(FakeTask {
            service: "ns11111",
            id: 7,
            statuses: &["init", "doing", "done"],
            ..Default::default()
        });

        api
    }

    mod backup_storage {
        use super::*;

        #[test]
        fn ok() {
            let mut api = api();

            let observed = api.backup_storage(&service_name("ns11111")).unwrap();

            pa::assert_eq!(Some(payload(json!({ "quota": 500 }))), observed);
        }

        #[test]
        fn given_unknown_service() {
            let mut api = api();

            let observed = api.backup_storage(&service_name("ns99999")).unwrap();

            pa::assert_eq!(None, observed);
        }
    }

    mod enable_backup_storage {
        use super::*;

        #[test]
        fn ok() {
            let mut api = api();

            api.enable_backup_storage(&service_name("ns22222")).unwrap();

            assert!(api
                .backup_storage(&service_name("ns22222"))
                .unwrap()
                .is_some());
        }

        #[test]
        fn given_already_enabled_storage() {
            let mut api = api();

            let actual = api
                .enable_backup_storage(&service_name("ns11111"))
                .unwrap_err();

            let expected = ApiError::Call {
                status: 409,
                message: "Backup storage is already active on ns11111".into(),
            };

            pa::assert_eq!(expected, actual);
        }
    }

    mod disable_backup_storage {
        use super::*;

        #[test]
        fn ok() {
            let mut api = api();

            api.disable_backup_storage(&service_name("ns11111")).unwrap();

            pa::assert_eq!(None, api.backup_storage(&service_name("ns11111")).unwrap());
        }

        #[test]
        fn given_unknown_service() {
            let mut api = api();

            api.disable_backup_storage(&service_name("ns99999"))
                .unwrap_err();
        }
    }

    mod acls {
        use super::*;

        #[test]
        fn fetch_returns_the_provider_shape() {
            let mut api = api();

            let observed = api
                .acl(&service_name("ns11111"), &ip_block("192.0.2.0/24"))
                .unwrap();

            pa::assert_eq!(
                Some(payload(json!({
                    "ipBlock": "192.0.2.0/24",
                    "cifs": false,
                    "ftp": true,
                    "nfs": false,
                }))),
                observed,
            );
        }

        #[test]
        fn replace_updates_permissions() {
            let mut api = api();

            api.replace_acl(
                &service_name("ns11111"),
                &ip_block("192.0.2.0/24"),
                Permissions {
                    nfs: true,
                    ..Default::default()
                },
            )
            .unwrap();

            let observed = api
                .acl(&service_name("ns11111"), &ip_block("192.0.2.0/24"))
                .unwrap()
                .unwrap();

            pa::assert_eq!(json!(false), observed["ftp"]);
            pa::assert_eq!(json!(true), observed["nfs"]);
        }

        #[test]
        fn create_then_delete() {
            let mut api = api();

            let service = service_name("ns11111");
            let ip = ip_block("203.0.113.5/32");

            api.create_acl(&service, &ip, Permissions::default()).unwrap();
            assert!(api.acl(&service, &ip).unwrap().is_some());

            api.delete_acl(&service, &ip).unwrap();
            pa::assert_eq!(None, api.acl(&service, &ip).unwrap());
        }

        #[test]
        fn delete_given_unknown_acl() {
            let mut api = api();

            api.delete_acl(&service_name("ns11111"), &ip_block("198.51.100.0/24"))
                .unwrap_err();
        }
    }

    mod tasks {
        use super::*;

        #[test]
        fn lists_only_matching_functions() {
            let mut api = api();

            api.add_task(FakeTask {
                service: "ns11111",
                id: 9,
                function: "hardReboot",
                ..Default::default()
            });

            let ids = api
                .tasks(&service_name("ns11111"), ACTIVATION_FUNCTION)
                .unwrap();

            pa::assert_eq!(vec![TaskId::new(7)], ids);
        }

        #[test]
        fn statuses_are_consumed_one_per_poll_and_the_last_sticks() {
            let mut api = api();
            let service = service_name("ns11111");

            let statuses: Vec<_> = (0..4)
                .map(|_| api.task(&service, TaskId::new(7)).unwrap().status)
                .collect();

            pa::assert_eq!(vec!["init", "doing", "done", "done"], statuses);
        }
    }

    #[test]
    fn injected_errors_fire() {
        let mut api = api();

        api.inject_error(FakeError::OnBackupStorage {
            service: "ns11111".into(),
        });

        let actual = api.backup_storage(&service_name("ns11111")).unwrap_err();

        pa::assert_eq!(ApiError::InjectedError, actual);
    }

    #[test]
    fn display() {
        let api = api();

        pa::assert_eq!(
            "ns11111: backup storage {\"quota\":500}\n\
             ns11111: acl 192.0.2.0/24 (cifs=false, ftp=true, nfs=false)\n\
             ns11111: task 7 [addBackupFTP] init\n",
            api.to_string(),
        );
    }
}
