//! Wire shapes for the handful of vim25 objects we read over VI/JSON.
//!
//! Only the fields the selector needs are declared; serde ignores the rest of
//! the (large) payloads vCenter sends back.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATACENTER: &str = "Datacenter";
pub const CLUSTER: &str = "ClusterComputeResource";

/// `ManagedObjectReference`: the (type, moid) pair every vim25 object is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl MoRef {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn is_a(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for MoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// The bits of `ServiceContent` needed to log in and start walking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: MoRef,
    pub session_manager: Option<MoRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub hz: u64,
    pub num_cpu_cores: u32,
}

/// `HostHardwareInfo` subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostHardware {
    pub cpu_info: CpuInfo,
    pub memory_size: u64,
}

/// `HostListSummaryQuickStats` subset. vCenter leaves these unset when the
/// host has not reported a sample yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStats {
    #[serde(default)]
    pub overall_cpu_usage: Option<u64>,
    #[serde(default)]
    pub overall_memory_usage: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    #[serde(default)]
    pub quick_stats: QuickStats,
}
