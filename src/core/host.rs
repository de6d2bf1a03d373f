use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ResourceType, SamplingError};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const HZ_PER_MHZ: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    NotResponding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    #[serde(rename = "poweredOn")]
    PoweredOn,
    #[serde(rename = "poweredOff")]
    PoweredOff,
    #[serde(rename = "standBy")]
    Standby,
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::NotResponding => write!(f, "notResponding"),
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::PoweredOn => write!(f, "poweredOn"),
            PowerState::PoweredOff => write!(f, "poweredOff"),
            PowerState::Standby => write!(f, "standBy"),
            PowerState::Unknown => write!(f, "unknown"),
        }
    }
}

/// `HostRuntimeInfo` subset, as vCenter reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRuntime {
    pub connection_state: ConnectionState,
    pub power_state: PowerState,
    #[serde(default)]
    pub in_maintenance_mode: bool,
}

/// Why a host was kept out of the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    NotConnected(ConnectionState),
    NotPoweredOn(PowerState),
    InMaintenanceMode,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::NotConnected(state) => write!(f, "not connected ({})", state),
            Ineligibility::NotPoweredOn(state) => write!(f, "not powered on ({})", state),
            Ineligibility::InMaintenanceMode => write!(f, "in maintenance mode"),
        }
    }
}

impl HostRuntime {
    /// Connected, powered on and out of maintenance, checked in that order.
    pub fn eligibility(&self) -> Result<(), Ineligibility> {
        if self.connection_state != ConnectionState::Connected {
            return Err(Ineligibility::NotConnected(self.connection_state));
        }
        if self.power_state != PowerState::PoweredOn {
            return Err(Ineligibility::NotPoweredOn(self.power_state));
        }
        if self.in_maintenance_mode {
            return Err(Ineligibility::InMaintenanceMode);
        }
        Ok(())
    }
}

/// Raw counters read off one host, before any arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSample {
    pub name: String,
    pub runtime: HostRuntime,
    pub cpu_hz: u64,
    pub cpu_cores: u32,
    pub memory_bytes: u64,
    pub cpu_usage_mhz: Option<u64>,
    pub memory_usage_mb: Option<u64>,
    pub num_vms: usize,
}

/// Derived availability figures for one host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRecord {
    pub name: String,
    pub connection_state: ConnectionState,
    pub power_state: PowerState,
    pub cpu_total_mhz: f64,
    pub cpu_usage_mhz: u64,
    pub cpu_available_mhz: f64,
    pub cpu_available_percent: f64,
    pub memory_total_mb: f64,
    pub memory_usage_mb: u64,
    pub memory_available_mb: f64,
    pub memory_available_percent: f64,
    pub num_vms: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balanced_score: Option<f64>,
}

impl HostRecord {
    pub fn from_sample(sample: &HostSample) -> Result<Self, SamplingError> {
        let cpu_usage_mhz = sample
            .cpu_usage_mhz
            .ok_or(SamplingError::MissingCounter("overallCpuUsage"))?;
        let memory_usage_mb = sample
            .memory_usage_mb
            .ok_or(SamplingError::MissingCounter("overallMemoryUsage"))?;

        let cpu_total_mhz = sample.cpu_hz as f64 / HZ_PER_MHZ * sample.cpu_cores as f64;
        if cpu_total_mhz <= 0.0 {
            return Err(SamplingError::ZeroCapacity {
                resource: ResourceType::Cpu,
            });
        }

        let memory_total_mb = sample.memory_bytes as f64 / BYTES_PER_MB;
        if memory_total_mb <= 0.0 {
            return Err(SamplingError::ZeroCapacity {
                resource: ResourceType::Memory,
            });
        }

        let cpu_available_mhz = cpu_total_mhz - cpu_usage_mhz as f64;
        let memory_available_mb = memory_total_mb - memory_usage_mb as f64;

        Ok(Self {
            name: sample.name.clone(),
            connection_state: sample.runtime.connection_state,
            power_state: sample.runtime.power_state,
            cpu_total_mhz,
            cpu_usage_mhz,
            cpu_available_mhz,
            cpu_available_percent: percent_of(cpu_available_mhz, cpu_total_mhz),
            memory_total_mb,
            memory_usage_mb,
            memory_available_mb,
            memory_available_percent: percent_of(memory_available_mb, memory_total_mb),
            num_vms: sample.num_vms,
            balanced_score: None,
        })
    }

    /// Mean of the two availability percentages.
    pub fn balanced(&self) -> f64 {
        (self.cpu_available_percent + self.memory_available_percent) / 2.0
    }
}

fn percent_of(part: f64, total: f64) -> f64 {
    part / total * 100.0
}
