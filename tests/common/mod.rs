// Shared fixtures: an in-memory inventory and a fake vCenter speaking VI/JSON over HTTP.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use esx_host_selector::core::host::{ConnectionState, HostRuntime, PowerState};
use esx_host_selector::core::vsphere::model::{CpuInfo, HostHardware, MoRef, QuickStats};
use esx_host_selector::{Inventory, SelectorError, SelectorResult};

pub const API_RELEASE: &str = "8.0.1.0";
pub const USER: &str = "svc_terraform@vsphere.local";
pub const PASSWORD: &str = "s3cret";
pub const SESSION_ID: &str = "52a8e1f0-fake-session";

/// One ESXi host as the test wants it to look.
#[derive(Debug, Clone)]
pub struct HostSpec {
    pub name: String,
    pub connection_state: ConnectionState,
    pub power_state: PowerState,
    pub in_maintenance_mode: bool,
    pub cpu_hz: u64,
    pub cpu_cores: u32,
    pub memory_bytes: u64,
    pub cpu_usage_mhz: Option<u64>,
    pub memory_usage_mb: Option<u64>,
    pub num_vms: usize,
}

impl HostSpec {
    /// 4 x 1 GHz cores and 64 GB of RAM, healthy and idle.
    pub fn healthy(name: &str) -> Self {
        Self {
            name: name.to_string(),
            connection_state: ConnectionState::Connected,
            power_state: PowerState::PoweredOn,
            in_maintenance_mode: false,
            cpu_hz: 1_000_000_000,
            cpu_cores: 4,
            memory_bytes: 64 * 1024 * 1024 * 1024,
            cpu_usage_mhz: Some(0),
            memory_usage_mb: Some(0),
            num_vms: 0,
        }
    }

    pub fn cpu_used(mut self, mhz: u64) -> Self {
        self.cpu_usage_mhz = Some(mhz);
        self
    }

    pub fn memory_used(mut self, mb: u64) -> Self {
        self.memory_usage_mb = Some(mb);
        self
    }

    pub fn vms(mut self, count: usize) -> Self {
        self.num_vms = count;
        self
    }

    pub fn maintenance(mut self) -> Self {
        self.in_maintenance_mode = true;
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connection_state = ConnectionState::Disconnected;
        self
    }

    pub fn powered_off(mut self) -> Self {
        self.power_state = PowerState::PoweredOff;
        self
    }

    pub fn no_counters(mut self) -> Self {
        self.cpu_usage_mhz = None;
        self.memory_usage_mb = None;
        self
    }

    fn runtime(&self) -> HostRuntime {
        HostRuntime {
            connection_state: self.connection_state,
            power_state: self.power_state,
            in_maintenance_mode: self.in_maintenance_mode,
        }
    }

    fn hardware(&self) -> HostHardware {
        HostHardware {
            cpu_info: CpuInfo {
                hz: self.cpu_hz,
                num_cpu_cores: self.cpu_cores,
            },
            memory_size: self.memory_bytes,
        }
    }

    fn quick_stats(&self) -> QuickStats {
        QuickStats {
            overall_cpu_usage: self.cpu_usage_mhz,
            overall_memory_usage: self.memory_usage_mb,
        }
    }
}

/// In-memory inventory: root folder -> datacenters -> host folder -> clusters -> hosts.
#[derive(Default)]
pub struct FakeInventory {
    root: Vec<MoRef>,
    names: HashMap<MoRef, String>,
    host_folders: HashMap<MoRef, MoRef>,
    children: HashMap<MoRef, Vec<MoRef>>,
    cluster_hosts: HashMap<MoRef, Vec<MoRef>>,
    hosts: HashMap<MoRef, HostSpec>,
    broken_hosts: Vec<MoRef>,
    next_id: AtomicUsize,
    /// Every (moid, property) read, in order.
    pub reads: Mutex<Vec<(String, String)>>,
}

impl FakeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn add_datacenter(&mut self, name: &str) -> MoRef {
        let dc = MoRef::new("Datacenter", self.next("datacenter"));
        let folder = MoRef::new("Folder", self.next("group-h"));
        self.root.push(dc.clone());
        self.names.insert(dc.clone(), name.to_string());
        self.names.insert(folder.clone(), "host".to_string());
        self.host_folders.insert(dc.clone(), folder.clone());
        self.children.insert(folder, Vec::new());
        dc
    }

    /// Puts a non-datacenter object at the root (e.g. a VM folder).
    pub fn add_root_folder(&mut self, name: &str) -> MoRef {
        let folder = MoRef::new("Folder", self.next("group-v"));
        self.root.push(folder.clone());
        self.names.insert(folder.clone(), name.to_string());
        folder
    }

    fn add_child(&mut self, datacenter: &MoRef, kind: &str, prefix: &str, name: &str) -> MoRef {
        let child = MoRef::new(kind, self.next(prefix));
        let folder = self.host_folders[datacenter].clone();
        self.children.entry(folder).or_default().push(child.clone());
        self.names.insert(child.clone(), name.to_string());
        child
    }

    pub fn add_cluster(&mut self, datacenter: &MoRef, name: &str) -> MoRef {
        let cluster = self.add_child(datacenter, "ClusterComputeResource", "domain-c", name);
        self.cluster_hosts.insert(cluster.clone(), Vec::new());
        cluster
    }

    /// A standalone host sitting next to the clusters.
    pub fn add_standalone(&mut self, datacenter: &MoRef, name: &str) -> MoRef {
        self.add_child(datacenter, "ComputeResource", "domain-s", name)
    }

    pub fn add_host(&mut self, cluster: &MoRef, spec: HostSpec) -> MoRef {
        let host = MoRef::new("HostSystem", self.next("host"));
        self.names.insert(host.clone(), spec.name.clone());
        self.cluster_hosts
            .entry(cluster.clone())
            .or_default()
            .push(host.clone());
        self.hosts.insert(host.clone(), spec);
        host
    }

    /// Hardware reads for this host will fail.
    pub fn break_host(&mut self, host: &MoRef) {
        self.broken_hosts.push(host.clone());
    }

    /// DC1 / CL1 with the given hosts.
    pub fn single_cluster(specs: Vec<HostSpec>) -> Self {
        let mut inv = Self::new();
        let dc = inv.add_datacenter("DC1");
        let cluster = inv.add_cluster(&dc, "CL1");
        for spec in specs {
            inv.add_host(&cluster, spec);
        }
        inv
    }

    pub fn reads_of(&self, property: &str) -> Vec<String> {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| p == property)
            .map(|(moid, _)| moid.clone())
            .collect()
    }

    fn record(&self, entity: &MoRef, property: &str) {
        self.reads
            .lock()
            .unwrap()
            .push((entity.value.clone(), property.to_string()));
    }

    fn missing(entity: &MoRef, property: &str) -> SelectorError {
        SelectorError::api(format!("{}/{}/{}", entity.kind, entity.value, property), "ManagedObjectNotFound")
    }

    fn spec(&self, host: &MoRef, property: &str) -> SelectorResult<&HostSpec> {
        self.record(host, property);
        self.hosts.get(host).ok_or_else(|| Self::missing(host, property))
    }

    /// Flattens the inventory into `Type/moid/property -> JSON`, the way
    /// the VI/JSON endpoint serves it.
    pub fn to_properties(&self, root_folder: &MoRef) -> HashMap<String, Value> {
        let mut props = HashMap::new();
        let key = |e: &MoRef, p: &str| format!("{}/{}/{}", e.kind, e.value, p);

        props.insert(key(root_folder, "childEntity"), json!(self.root));
        for (entity, name) in &self.names {
            props.insert(key(entity, "name"), json!(name));
        }
        for (dc, folder) in &self.host_folders {
            props.insert(key(dc, "hostFolder"), json!(folder));
        }
        for (folder, children) in &self.children {
            props.insert(key(folder, "childEntity"), json!(children));
        }
        for (cluster, hosts) in &self.cluster_hosts {
            props.insert(key(cluster, "host"), json!(hosts));
        }
        for (host, spec) in &self.hosts {
            props.insert(key(host, "runtime"), json!(spec.runtime()));
            if !self.broken_hosts.contains(host) {
                props.insert(key(host, "hardware"), json!(spec.hardware()));
            }
            props.insert(
                key(host, "summary"),
                json!({ "_typeName": "HostListSummary", "quickStats": spec.quick_stats() }),
            );
            let vms: Vec<MoRef> = (0..spec.num_vms)
                .map(|i| MoRef::new("VirtualMachine", format!("vm-{}-{}", host.value, i)))
                .collect();
            props.insert(key(host, "vm"), json!(vms));
        }
        props
    }
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn root_children(&self) -> SelectorResult<Vec<MoRef>> {
        Ok(self.root.clone())
    }

    async fn name(&self, entity: &MoRef) -> SelectorResult<String> {
        self.record(entity, "name");
        self.names
            .get(entity)
            .cloned()
            .ok_or_else(|| Self::missing(entity, "name"))
    }

    async fn host_folder(&self, datacenter: &MoRef) -> SelectorResult<MoRef> {
        self.host_folders
            .get(datacenter)
            .cloned()
            .ok_or_else(|| Self::missing(datacenter, "hostFolder"))
    }

    async fn folder_children(&self, folder: &MoRef) -> SelectorResult<Vec<MoRef>> {
        Ok(self.children.get(folder).cloned().unwrap_or_default())
    }

    async fn cluster_hosts(&self, cluster: &MoRef) -> SelectorResult<Vec<MoRef>> {
        Ok(self.cluster_hosts.get(cluster).cloned().unwrap_or_default())
    }

    async fn host_runtime(&self, host: &MoRef) -> SelectorResult<HostRuntime> {
        Ok(self.spec(host, "runtime")?.runtime())
    }

    async fn host_hardware(&self, host: &MoRef) -> SelectorResult<HostHardware> {
        let spec = self.spec(host, "hardware")?;
        if self.broken_hosts.contains(host) {
            return Err(Self::missing(host, "hardware"));
        }
        Ok(spec.hardware())
    }

    async fn host_quick_stats(&self, host: &MoRef) -> SelectorResult<QuickStats> {
        Ok(self.spec(host, "summary")?.quick_stats())
    }

    async fn host_vm_count(&self, host: &MoRef) -> SelectorResult<usize> {
        Ok(self.spec(host, "vm")?.num_vms)
    }
}

/// A pretend vCenter: serves property reads out of a map and counts sessions.
pub struct FakeVcenter {
    properties: HashMap<String, Value>,
    root_folder: MoRef,
    pub logins: AtomicUsize,
    pub logouts: AtomicUsize,
    pub unauthorized_reads: AtomicUsize,
}

impl FakeVcenter {
    pub fn new(inventory: &FakeInventory) -> Arc<Self> {
        let root_folder = MoRef::new("Folder", "group-d1");
        Arc::new(Self {
            properties: inventory.to_properties(&root_folder),
            root_folder,
            logins: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            unauthorized_reads: AtomicUsize::new(0),
        })
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("vmware-api-session-id")
            .and_then(|v| v.to_str().ok())
            == Some(SESSION_ID)
    }

    /// Binds 127.0.0.1 on a random port and returns the `http://` server address.
    pub async fn spawn(self: &Arc<Self>) -> String {
        let app = Router::new()
            .route(
                "/sdk/vim25/{release}/{kind}/{moid}/{member}",
                get(read_property).post(invoke_method),
            )
            .with_state(Arc::clone(self));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn read_property(
    State(fake): State<Arc<FakeVcenter>>,
    Path((_release, kind, moid, member)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if kind == "ServiceInstance" && member == "content" {
        return Json(json!({
            "_typeName": "ServiceContent",
            "rootFolder": fake.root_folder,
            "sessionManager": { "_typeName": "ManagedObjectReference", "type": "SessionManager", "value": "SessionManager" },
        }))
        .into_response();
    }

    if !fake.authorized(&headers) {
        fake.unauthorized_reads.fetch_add(1, Ordering::SeqCst);
        return (StatusCode::UNAUTHORIZED, "NotAuthenticated").into_response();
    }

    match fake.properties.get(&format!("{}/{}/{}", kind, moid, member)) {
        Some(value) => Json(value.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "ManagedObjectNotFound").into_response(),
    }
}

async fn invoke_method(
    State(fake): State<Arc<FakeVcenter>>,
    Path((_release, _kind, _moid, member)): Path<(String, String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match member.as_str() {
        "Login" => {
            let request: Value = serde_json::from_slice(&body).unwrap_or_default();
            if request["userName"] != USER || request["password"] != PASSWORD {
                return (StatusCode::BAD_REQUEST, "InvalidLogin").into_response();
            }
            fake.logins.fetch_add(1, Ordering::SeqCst);
            (
                [("vmware-api-session-id", SESSION_ID)],
                Json(json!({ "_typeName": "UserSession", "userName": USER })),
            )
                .into_response()
        }
        "Logout" if fake.authorized(&headers) => {
            fake.logouts.fetch_add(1, Ordering::SeqCst);
            StatusCode::NO_CONTENT.into_response()
        }
        "Logout" => (StatusCode::UNAUTHORIZED, "NotAuthenticated").into_response(),
        _ => (StatusCode::NOT_FOUND, "MethodNotFound").into_response(),
    }
}
