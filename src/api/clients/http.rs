use crate::api::*;
use crate::config::Config;
use anyhow::anyhow;
use chrono::Utc;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sha1::{Digest, Sha1};
use std::time::Duration;

/// Client for the OVH REST API; implements the request signing the provider
/// requires (sha1 over secret, consumer key, method, url, body and a
/// drift-corrected timestamp).
pub struct OvhClient {
    http: Client,
    base_url: String,
    application_key: String,
    application_secret: String,
    consumer_key: String,
    time_delta: Option<i64>,
}

impl OvhClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()?;

        Ok(Self {
            http,
            base_url: config.endpoint.url().to_string(),
            application_key: config.application_key.clone(),
            application_secret: config.application_secret.clone(),
            consumer_key: config.consumer_key.clone(),
            time_delta: None,
        })
    }

    /// Signatures embed a timestamp the provider checks, so a skewed local
    /// clock would get every request rejected; we ask the API for its own
    /// time once and remember the difference.
    fn time_delta(&mut self) -> ApiResult<i64> {
        if let Some(delta) = self.time_delta {
            return Ok(delta);
        }

        let url = format!("{}/auth/time", self.base_url);

        let server_time: i64 = self
            .http
            .get(url)
            .send()?
            .error_for_status()?
            .json()
            .map_err(|err| anyhow!(err).context("Couldn't read the OVH API's time"))?;

        let delta = server_time - Utc::now().timestamp();

        self.time_delta = Some(delta);

        Ok(delta)
    }

    fn signature(&self, method: &str, url: &str, body: &str, timestamp: i64) -> String {
        let mut sha = Sha1::new();

        sha.update(format!(
            "{}+{}+{}+{}+{}+{}",
            self.application_secret, self.consumer_key, method, url, body, timestamp,
        ));

        format!("$1${}", hex::encode(sha.finalize()))
    }

    fn call(&mut self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let body = body.map(Value::to_string).unwrap_or_default();
        let timestamp = Utc::now().timestamp() + self.time_delta()?;
        let signature = self.signature(method.as_str(), &url, &body, timestamp);

        let mut request = self
            .http
            .request(method, url)
            .header("X-Ovh-Application", &self.application_key)
            .header("X-Ovh-Consumer", &self.consumer_key)
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature);

        if !body.is_empty() {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }

        Ok(request.send()?)
    }

    /// GET where "not found" is a valid observation, not a failure.
    fn try_get<T>(&mut self, path: &str) -> ApiResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.call(Method::GET, path, None)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::decode(response).map(Some)
    }

    fn get<T>(&mut self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.call(Method::GET, path, None)?;

        Self::decode(response)
    }

    fn post<T>(&mut self, path: &str, body: Value) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.call(Method::POST, path, Some(&body))?;

        Self::decode(response)
    }

    fn put<T>(&mut self, path: &str, body: Value) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.call(Method::PUT, path, Some(&body))?;

        Self::decode(response)
    }

    fn delete<T>(&mut self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.call(Method::DELETE, path, None)?;

        Self::decode(response)
    }

    fn decode<T>(response: Response) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if !status.is_success() {
            return Err(ApiError::Call {
                status: status.as_u16(),
                message: Self::error_message(response),
            });
        }

        // PUT and DELETE answer with a json `null` body
        let value: Value = response.json()?;

        let value = if value.is_null() {
            Value::Object(Default::default())
        } else {
            value
        };

        serde_json::from_value(value)
            .map_err(|err| anyhow!(err).context("Couldn't decode the OVH API's response"))
            .map_err(ApiError::Other)
    }

    fn error_message(response: Response) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        match response.json::<ErrorBody>() {
            Ok(body) => body.message,
            Err(_) => "(the response carried no error details)".into(),
        }
    }

    fn feature_path(service: &ServiceName) -> String {
        format!("/dedicated/server/{}/features/backupFTP", service)
    }

    fn acl_path(service: &ServiceName, ip: &IpBlock) -> String {
        format!(
            "/dedicated/server/{}/features/backupFTP/access/{}",
            service,
            ip.path_segment(),
        )
    }
}

impl BackupApi for OvhClient {
    fn backup_storage(&mut self, service: &ServiceName) -> ApiResult<Option<Payload>> {
        self.try_get(&Self::feature_path(service))
    }

    fn enable_backup_storage(&mut self, service: &ServiceName) -> ApiResult<Payload> {
        self.post(&Self::feature_path(service), json!({}))
    }

    fn disable_backup_storage(&mut self, service: &ServiceName) -> ApiResult<Payload> {
        self.delete(&Self::feature_path(service))
    }

    fn acl(&mut self, service: &ServiceName, ip: &IpBlock) -> ApiResult<Option<Payload>> {
        self.try_get(&Self::acl_path(service, ip))
    }

    fn create_acl(
        &mut self,
        service: &ServiceName,
        ip: &IpBlock,
        permissions: Permissions,
    ) -> ApiResult<Payload> {
        let path = format!("/dedicated/server/{}/features/backupFTP/access", service);

        self.post(
            &path,
            json!({
                "ipBlock": ip.as_str(),
                "cifs": permissions.cifs,
                "ftp": permissions.ftp,
                "nfs": permissions.nfs,
            }),
        )
    }

    fn replace_acl(
        &mut self,
        service: &ServiceName,
        ip: &IpBlock,
        permissions: Permissions,
    ) -> ApiResult<Payload> {
        self.put(
            &Self::acl_path(service, ip),
            json!({
                "cifs": permissions.cifs,
                "ftp": permissions.ftp,
                "nfs": permissions.nfs,
            }),
        )
    }

    fn delete_acl(&mut self, service: &ServiceName, ip: &IpBlock) -> ApiResult<Payload> {
        self.delete(&Self::acl_path(service, ip))
    }

    fn tasks(&mut self, service: &ServiceName, function: &str) -> ApiResult<Vec<TaskId>> {
        let path = format!("/dedicated/server/{}/task?function={}", service, function);

        self.get(&path)
    }

    fn task(&mut self, service: &ServiceName, task: TaskId) -> ApiResult<Task> {
        let path = format!("/dedicated/server/{}/task/{}", service, task);

        self.get(&path)
    }
}
