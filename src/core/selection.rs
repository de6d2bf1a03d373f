use clap::ValueEnum;
use serde::Serialize;
use std::cmp::Ordering;

use super::host::HostRecord;

/// What "most available" means for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Metric {
    /// Most free CPU, in MHz
    Cpu,
    /// Most free memory, in MB
    Memory,
    /// Best mean of free CPU % and free memory %
    #[default]
    Balanced,
}

impl Metric {
    pub fn score(&self, host: &HostRecord) -> f64 {
        match self {
            Metric::Cpu => host.cpu_available_mhz,
            Metric::Memory => host.memory_available_mb,
            Metric::Balanced => host.balanced_score.unwrap_or_else(|| host.balanced()),
        }
    }
}

/// The winner plus everything it was compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub selected_host: HostRecord,
    pub all_hosts: Vec<HostRecord>,
}

/// Picks the host with the highest score for `metric`.
///
/// Equal scores go to the lexicographically smallest name, so the answer
/// does not depend on the order vCenter happened to list the hosts in.
/// Returns `None` for an empty candidate list.
pub fn select_best(mut hosts: Vec<HostRecord>, metric: Metric) -> Option<Selection> {
    if metric == Metric::Balanced {
        for host in hosts.iter_mut() {
            host.balanced_score = Some(host.balanced());
        }
    }

    let best = hosts
        .iter()
        .reduce(|best, candidate| match rank(candidate, best, metric) {
            Ordering::Greater => candidate,
            _ => best,
        })?
        .clone();

    Some(Selection {
        selected_host: best,
        all_hosts: hosts,
    })
}

// Greater means `a` beats `b`.
fn rank(a: &HostRecord, b: &HostRecord, metric: Metric) -> Ordering {
    metric
        .score(a)
        .total_cmp(&metric.score(b))
        .then_with(|| b.name.cmp(&a.name))
}
