use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::model::{
    HostHardware, HostSummary, LoginRequest, MoRef, QuickStats, ServiceContent,
};
use crate::config::Credentials;
use crate::core::host::HostRuntime;
use crate::core::inventory::Inventory;
use crate::errors::{SelectorError, SelectorResult};

pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// An authenticated VI/JSON session against one vCenter.
///
/// Built by [`VsphereSession::login`], released by [`VsphereSession::logout`],
/// which takes `self` so a session can only be closed once.
pub struct VsphereSession {
    http: Client,
    base_url: String,
    session_id: String,
    session_manager: MoRef,
    root_folder: MoRef,
}

impl VsphereSession {
    pub async fn login(credentials: &Credentials, api_release: &str) -> SelectorResult<Self> {
        let http = Client::builder()
            // vCenter ships with a self-signed cert and nobody ever replaces it
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .build()
            .map_err(SelectorError::connection)?;

        let base_url = base_url(&credentials.server, api_release);
        debug!("Using VI/JSON endpoint {}", base_url);

        let content_url = format!("{}/ServiceInstance/ServiceInstance/content", base_url);
        let response = http
            .get(&content_url)
            .send()
            .await
            .map_err(SelectorError::connection)?;
        let content: ServiceContent = expect_success(response)
            .await
            .map_err(SelectorError::connection)?
            .json()
            .await
            .map_err(SelectorError::connection)?;

        let session_manager = content
            .session_manager
            .ok_or_else(|| SelectorError::connection("service content has no session manager"))?;

        let login_url = format!(
            "{}/SessionManager/{}/Login",
            base_url, session_manager.value
        );
        let response = http
            .post(&login_url)
            .json(&LoginRequest {
                user_name: &credentials.user,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(SelectorError::connection)?;
        let response = expect_success(response)
            .await
            .map_err(SelectorError::connection)?;

        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                SelectorError::connection(format!("login response carried no {} header", SESSION_HEADER))
            })?;

        info!(server = %credentials.server, user = %credentials.user, "Connected to vSphere");

        Ok(Self {
            http,
            base_url,
            session_id,
            session_manager,
            root_folder: content.root_folder,
        })
    }

    /// Ends the session. Failures are logged, never returned: by the time we
    /// log out the result is already decided.
    pub async fn logout(self) {
        let url = format!(
            "{}/SessionManager/{}/Logout",
            self.base_url, self.session_manager.value
        );
        let outcome = match self
            .http
            .post(&url)
            .header(SESSION_HEADER, &self.session_id)
            .send()
            .await
        {
            Ok(response) => expect_success(response).await.map(|_| ()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => debug!("Disconnected from vSphere"),
            Err(e) => warn!("Failed to log out of vSphere cleanly: {}", e),
        }
    }

    /// GETs one property of one managed object.
    pub async fn property<T: DeserializeOwned>(
        &self,
        entity: &MoRef,
        property: &str,
    ) -> SelectorResult<T> {
        let path = format!("{}/{}/{}", entity.kind, entity.value, property);
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .header(SESSION_HEADER, &self.session_id)
            .send()
            .await
            .map_err(|e| SelectorError::api(&path, e))?;

        expect_success(response)
            .await
            .map_err(|e| SelectorError::api(&path, e))?
            .json::<T>()
            .await
            .map_err(|e| SelectorError::api(&path, e))
    }
}

#[async_trait]
impl Inventory for VsphereSession {
    async fn root_children(&self) -> SelectorResult<Vec<MoRef>> {
        self.property(&self.root_folder, "childEntity").await
    }

    async fn name(&self, entity: &MoRef) -> SelectorResult<String> {
        self.property(entity, "name").await
    }

    async fn host_folder(&self, datacenter: &MoRef) -> SelectorResult<MoRef> {
        self.property(datacenter, "hostFolder").await
    }

    async fn folder_children(&self, folder: &MoRef) -> SelectorResult<Vec<MoRef>> {
        self.property(folder, "childEntity").await
    }

    async fn cluster_hosts(&self, cluster: &MoRef) -> SelectorResult<Vec<MoRef>> {
        self.property(cluster, "host").await
    }

    async fn host_runtime(&self, host: &MoRef) -> SelectorResult<HostRuntime> {
        self.property(host, "runtime").await
    }

    async fn host_hardware(&self, host: &MoRef) -> SelectorResult<HostHardware> {
        self.property(host, "hardware").await
    }

    async fn host_quick_stats(&self, host: &MoRef) -> SelectorResult<QuickStats> {
        let summary: HostSummary = self.property(host, "summary").await?;
        Ok(summary.quick_stats)
    }

    async fn host_vm_count(&self, host: &MoRef) -> SelectorResult<usize> {
        let vms: Vec<MoRef> = self.property(host, "vm").await?;
        Ok(vms.len())
    }
}

/// `vcenter.lab.local` becomes `https://vcenter.lab.local/sdk/vim25/<release>`.
/// A server that already carries a scheme is used as-is.
pub fn base_url(server: &str, api_release: &str) -> String {
    let server = server.trim_end_matches('/');
    if server.contains("://") {
        format!("{}/sdk/vim25/{}", server, api_release)
    } else {
        format!("https://{}/sdk/vim25/{}", server, api_release)
    }
}

async fn expect_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status, body.trim()))
}
