use serde::Serialize;
use std::collections::BTreeMap;

/// One point-in-time health document. Built once per run by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub time_t: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_summary: Option<ProbeDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmstat_summary: Option<ProbeDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netstat_summary: Option<ProbeDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_usage: Option<Vec<InterfaceRate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_stats: Option<ProbeDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstat_summary: Option<Vec<DiskIoRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zfs_arcstats: Option<ArcSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_temperatures: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smb: Option<ServiceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfs: Option<ServiceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iscsi: Option<ServiceSummary>,
}

impl Snapshot {
    pub fn new(time_t: i64) -> Self {
        Self {
            time_t,
            ..Self::default()
        }
    }
}

/// A JSON-shaped probe result.
///
/// Native libxo output is carried as an opaque value and republished as-is.
/// Platforms without libxo produce the typed variants, which serialize to the
/// same shape the FreeBSD tools emit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeDocument {
    Opaque(serde_json::Value),
    Memory(VmstatMemory),
    Cpu(CpuLoadSummary),
}

impl ProbeDocument {
    pub fn is_empty(&self) -> bool {
        match self {
            ProbeDocument::Opaque(value) => value.is_null(),
            ProbeDocument::Memory(memory) => memory.summary == MemorySummary::default(),
            ProbeDocument::Cpu(cpu) => cpu.cpu.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VmstatMemory {
    #[serde(rename = "summary-statistics")]
    pub summary: MemorySummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemorySummary {
    pub active_bytes: f64,
    pub inactive_bytes: f64,
    pub free_bytes: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub laundry_bytes: f64,
    pub wired_bytes: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_bytes: f64,
    pub swap_used_bytes: f64,
    pub swap_free_bytes: f64,
    pub swap_total_bytes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuLoadSummary {
    pub cpu: Vec<CpuLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuLoad {
    pub idle: String,
    pub name: u32,
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiskIoRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "L(Q)")]
    pub queue_length: f64,
    #[serde(rename = "ops/s")]
    pub ops_per_sec: f64,
    #[serde(rename = "r/s")]
    pub reads_per_sec: f64,
    #[serde(rename = "kB r")]
    pub read_kb: f64,
    #[serde(rename = "kBps r")]
    pub read_kbps: f64,
    #[serde(rename = "ms/r")]
    pub read_latency_ms: f64,
    #[serde(rename = "w/s")]
    pub writes_per_sec: f64,
    #[serde(rename = "kB w")]
    pub write_kb: f64,
    #[serde(rename = "kBps w")]
    pub write_kbps: f64,
    #[serde(rename = "ms/w")]
    pub write_latency_ms: f64,
    #[serde(rename = "%busy")]
    pub busy_percent: f64,
}

/// Interface throughput. Rates keep the sampling tool's own text formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceRate {
    pub name: String,
    #[serde(rename = "KB/s in")]
    pub in_kbps: String,
    #[serde(rename = "KB/s out")]
    pub out_kbps: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArcSummary {
    pub read: f64,
    pub miss: f64,
    #[serde(rename = "miss%")]
    pub miss_percent: f64,
    pub dmis: f64,
    #[serde(rename = "dm%")]
    pub dmis_percent: f64,
    pub pmis: f64,
    #[serde(rename = "pm%")]
    pub pmis_percent: f64,
    pub mmis: f64,
    #[serde(rename = "mm%")]
    pub mmis_percent: f64,
    pub arcsz: String,
    pub c: String,
}

impl ArcSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub client_count: u32,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_snapshot_only_carries_timestamp() {
        let text = serde_json::to_string(&Snapshot::new(1_700_000_000)).unwrap();
        assert_eq!(text, r#"{"time_t":1700000000}"#);
    }

    #[test]
    fn memory_summary_uses_libxo_field_names() {
        let doc = ProbeDocument::Memory(VmstatMemory {
            summary: MemorySummary {
                active_bytes: 1024.0,
                free_bytes: 2048.0,
                ..MemorySummary::default()
            },
        });
        let value = serde_json::to_value(&doc).unwrap();
        let summary = &value["summary-statistics"];
        assert_eq!(summary["active-bytes"], json!(1024.0));
        assert_eq!(summary["free-bytes"], json!(2048.0));
        assert!(summary.get("laundry-bytes").is_none());
        assert!(summary.get("total-bytes").is_none());
        assert_eq!(summary["swap-total-bytes"], json!(0.0));
    }

    #[test]
    fn opaque_document_serializes_unchanged() {
        let raw = json!({"statistics": {"interface": [{"name": "em0", "received-packets": 10}]}});
        let doc = ProbeDocument::Opaque(raw.clone());
        assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
        assert!(!doc.is_empty());
        assert!(ProbeDocument::Opaque(serde_json::Value::Null).is_empty());
    }

    #[test]
    fn zero_memory_and_cpu_documents_are_empty() {
        assert!(ProbeDocument::Memory(VmstatMemory::default()).is_empty());
        assert!(ProbeDocument::Cpu(CpuLoadSummary::default()).is_empty());

        let swap_only = VmstatMemory {
            summary: MemorySummary {
                swap_total_bytes: 4096.0,
                ..MemorySummary::default()
            },
        };
        assert!(!ProbeDocument::Memory(swap_only).is_empty());
    }

    #[test]
    fn disk_record_keeps_gstat_column_names() {
        let record = DiskIoRecord {
            name: "ada0".to_string(),
            busy_percent: 62.3,
            ..DiskIoRecord::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Name"], json!("ada0"));
        assert_eq!(value["%busy"], json!(62.3));
        assert_eq!(value["kBps w"], json!(0.0));
    }
}
