use super::dispatch::ProbeHandle;
use super::{Field, ProbeValue};
use crate::snapshot::Snapshot;
use tracing::{debug, warn};

/// Waits for every handle and assembles the snapshot. Probes that failed, or
/// returned nothing usable, leave their field unset.
pub async fn assemble(handles: Vec<ProbeHandle>, time_t: i64) -> Snapshot {
    let mut snapshot = Snapshot::new(time_t);
    for handle in handles {
        let value = match handle.result.await {
            Ok(value) => value,
            Err(_) => {
                warn!(probe = handle.field.key(), program = %handle.program, "probe task ended without a result");
                ProbeValue::Absent
            }
        };
        assign(&mut snapshot, handle.field, value);
    }
    snapshot
}

fn assign(snapshot: &mut Snapshot, field: Field, value: ProbeValue) {
    match (field, value) {
        (_, ProbeValue::Absent) => {}
        (Field::Memory, ProbeValue::Document(doc)) if !doc.is_empty() => {
            snapshot.memory_summary = Some(doc)
        }
        (Field::Cpu, ProbeValue::Document(doc)) if !doc.is_empty() => {
            snapshot.vmstat_summary = Some(doc)
        }
        (Field::NetworkCounters, ProbeValue::Document(doc)) if !doc.is_empty() => {
            snapshot.netstat_summary = Some(doc)
        }
        (Field::Processes, ProbeValue::Document(doc)) if !doc.is_empty() => {
            snapshot.process_stats = Some(doc)
        }
        (Field::InterfaceRates, ProbeValue::Interfaces(rates)) if !rates.is_empty() => {
            snapshot.network_usage = Some(rates)
        }
        (Field::DiskIo, ProbeValue::DiskIo(disks)) if !disks.is_empty() => {
            snapshot.gstat_summary = Some(disks)
        }
        (Field::Arc, ProbeValue::Arc(arc)) if !arc.is_empty() => snapshot.zfs_arcstats = Some(arc),
        (Field::Temperatures, ProbeValue::Sensors(temps)) if !temps.is_empty() => {
            snapshot.cpu_temperatures = Some(temps)
        }
        (Field::Smb, ProbeValue::Service(summary)) => snapshot.smb = Some(summary),
        (Field::Nfs, ProbeValue::Service(summary)) => snapshot.nfs = Some(summary),
        (Field::Iscsi, ProbeValue::Service(summary)) => snapshot.iscsi = Some(summary),
        (field, _) => debug!(probe = field.key(), "probe returned no usable data"),
    }
}
