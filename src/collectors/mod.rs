pub mod aggregate;
pub mod dispatch;
pub mod exec;
pub mod profile;

use crate::config::DeadlineConfig;
use crate::snapshot::{ArcSummary, DiskIoRecord, InterfaceRate, ProbeDocument, ServiceSummary, Snapshot};
use profile::Profile;
use std::collections::BTreeMap;

/// The snapshot field a probe fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Memory,
    Cpu,
    NetworkCounters,
    InterfaceRates,
    Processes,
    DiskIo,
    Arc,
    Temperatures,
    Smb,
    Nfs,
    Iscsi,
}

impl Field {
    /// The field's key in the emitted document.
    pub fn key(self) -> &'static str {
        match self {
            Field::Memory => "memory_summary",
            Field::Cpu => "vmstat_summary",
            Field::NetworkCounters => "netstat_summary",
            Field::InterfaceRates => "network_usage",
            Field::Processes => "process_stats",
            Field::DiskIo => "gstat_summary",
            Field::Arc => "zfs_arcstats",
            Field::Temperatures => "cpu_temperatures",
            Field::Smb => "smb",
            Field::Nfs => "nfs",
            Field::Iscsi => "iscsi",
        }
    }
}

/// A parsed probe result on its way to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeValue {
    /// The probe failed, timed out or printed nothing decodable.
    Absent,
    Document(ProbeDocument),
    DiskIo(Vec<DiskIoRecord>),
    Interfaces(Vec<InterfaceRate>),
    Arc(ArcSummary),
    Sensors(BTreeMap<String, String>),
    Service(ServiceSummary),
}

/// Runs every probe in `profile` concurrently and returns the assembled
/// snapshot. Wall time is bounded by the longest deadline in use.
pub async fn capture(profile: Profile, deadlines: &DeadlineConfig, time_t: i64) -> Snapshot {
    let handles = dispatch::dispatch(profile, deadlines);
    aggregate::assemble(handles, time_t).await
}
