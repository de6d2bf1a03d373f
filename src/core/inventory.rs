use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::host::{HostRecord, HostRuntime, HostSample};
use super::selection::{select_best, Metric, Selection};
use super::vsphere::model::{HostHardware, MoRef, QuickStats, CLUSTER, DATACENTER};
use crate::errors::{SamplingError, SelectorError, SelectorResult};

/// Read-only view of a vCenter inventory.
///
/// One method per property the selector touches, so the walk below can run
/// against a live session or an in-memory fake alike.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn root_children(&self) -> SelectorResult<Vec<MoRef>>;
    async fn name(&self, entity: &MoRef) -> SelectorResult<String>;
    async fn host_folder(&self, datacenter: &MoRef) -> SelectorResult<MoRef>;
    async fn folder_children(&self, folder: &MoRef) -> SelectorResult<Vec<MoRef>>;
    async fn cluster_hosts(&self, cluster: &MoRef) -> SelectorResult<Vec<MoRef>>;
    async fn host_runtime(&self, host: &MoRef) -> SelectorResult<HostRuntime>;
    async fn host_hardware(&self, host: &MoRef) -> SelectorResult<HostHardware>;
    async fn host_quick_stats(&self, host: &MoRef) -> SelectorResult<QuickStats>;
    async fn host_vm_count(&self, host: &MoRef) -> SelectorResult<usize>;
}

/// Datacenter -> host folder -> cluster, exact name match, first hit wins.
///
/// Only direct children are looked at on both levels: datacenters nested in
/// folders and clusters nested in sub-folders are not found.
pub async fn find_cluster<I>(inventory: &I, datacenter: &str, cluster: &str) -> SelectorResult<MoRef>
where
    I: Inventory + ?Sized,
{
    let mut datacenter_seen = false;

    for dc in inventory.root_children().await? {
        if !dc.is_a(DATACENTER) || inventory.name(&dc).await? != datacenter {
            continue;
        }
        datacenter_seen = true;

        let folder = inventory.host_folder(&dc).await?;
        for child in inventory.folder_children(&folder).await? {
            if child.is_a(CLUSTER) && inventory.name(&child).await? == cluster {
                debug!("Found cluster {} ({}) in datacenter {}", cluster, child, datacenter);
                return Ok(child);
            }
        }
    }

    let (datacenter, cluster) = (datacenter.to_string(), cluster.to_string());
    if datacenter_seen {
        Err(SelectorError::ClusterNotFound { datacenter, cluster })
    } else {
        Err(SelectorError::DatacenterNotFound { datacenter, cluster })
    }
}

/// Reads the resource counters of a host that already passed the filter.
pub async fn sample_host<I>(
    inventory: &I,
    host: &MoRef,
    name: String,
    runtime: HostRuntime,
) -> Result<HostSample, SamplingError>
where
    I: Inventory + ?Sized,
{
    let hardware = inventory.host_hardware(host).await?;
    let stats = inventory.host_quick_stats(host).await?;
    let num_vms = inventory.host_vm_count(host).await?;

    Ok(HostSample {
        name,
        runtime,
        cpu_hz: hardware.cpu_info.hz,
        cpu_cores: hardware.cpu_info.num_cpu_cores,
        memory_bytes: hardware.memory_size,
        cpu_usage_mhz: stats.overall_cpu_usage,
        memory_usage_mb: stats.overall_memory_usage,
        num_vms,
    })
}

/// Walks the cluster's hosts and returns records for the eligible ones.
///
/// Hosts that fail the connection/power/maintenance check are dropped before
/// any counter is read. A host whose fields cannot be read is dropped with a
/// warning; that is never fatal for the run.
pub async fn collect_candidates<I>(inventory: &I, cluster: &MoRef) -> SelectorResult<Vec<HostRecord>>
where
    I: Inventory + ?Sized,
{
    let hosts = inventory.cluster_hosts(cluster).await?;
    debug!("Cluster {} has {} hosts", cluster, hosts.len());

    let mut records = Vec::with_capacity(hosts.len());
    for host in &hosts {
        let name = match inventory.name(host).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Failed to read name of host {}: {}", host, e);
                continue;
            }
        };

        let runtime = match inventory.host_runtime(host).await {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Failed to get runtime state for host {}: {}", name, e);
                continue;
            }
        };

        if let Err(reason) = runtime.eligibility() {
            debug!("Skipping {}: {}", name, reason);
            continue;
        }

        let record = sample_host(inventory, host, name.clone(), runtime)
            .await
            .and_then(|sample| HostRecord::from_sample(&sample));
        match record {
            Ok(record) => records.push(record),
            Err(e) => warn!("Failed to get resources for host {}: {}", name, e),
        }
    }

    Ok(records)
}

/// The whole lookup: find the cluster, filter its hosts, pick the best one.
pub async fn select_host<I>(
    inventory: &I,
    datacenter: &str,
    cluster: &str,
    metric: Metric,
) -> SelectorResult<Selection>
where
    I: Inventory + ?Sized,
{
    let cluster_ref = find_cluster(inventory, datacenter, cluster).await?;
    let candidates = collect_candidates(inventory, &cluster_ref).await?;
    let evaluated = candidates.len();

    let selection = select_best(candidates, metric).ok_or_else(|| SelectorError::NoEligibleHosts {
        cluster: cluster.to_string(),
    })?;

    info!(
        host = %selection.selected_host.name,
        metric = ?metric,
        evaluated,
        "Selected host"
    );
    Ok(selection)
}
