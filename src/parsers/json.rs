use crate::snapshot::{CpuLoad, CpuLoadSummary};
use serde::Deserialize;
use tracing::debug;

/// Decodes libxo JSON output without assuming a schema.
pub fn parse_passthrough(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) if !value.is_null() => Some(value),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "probe output is not valid JSON");
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MpstatOutput {
    #[serde(default)]
    sysstat: MpstatSysstat,
}

#[derive(Debug, Default, Deserialize)]
struct MpstatSysstat {
    #[serde(default)]
    hosts: Vec<MpstatHost>,
}

#[derive(Debug, Default, Deserialize)]
struct MpstatHost {
    #[serde(default)]
    statistics: Vec<MpstatSample>,
}

#[derive(Debug, Default, Deserialize)]
struct MpstatSample {
    #[serde(default, rename = "cpu-load")]
    cpu_load: Vec<MpstatCpu>,
}

// mpstat also reports nice, iowait, irq, soft, steal, guest and gnice; they
// are not part of the vmstat shape.
#[derive(Debug, Default, Deserialize)]
struct MpstatCpu {
    #[serde(default)]
    cpu: String,
    #[serde(default)]
    usr: f64,
    #[serde(default)]
    sys: f64,
    #[serde(default)]
    idle: f64,
}

// Percentages are rounded at single precision, matching the vmstat text.
impl MpstatCpu {
    fn to_cpu_load(&self) -> Option<CpuLoad> {
        let name = self.cpu.trim().parse::<u32>().ok()?;
        Some(CpuLoad {
            idle: format!("{:.2}", self.idle as f32),
            name,
            system: format!("{:.2}", self.sys as f32),
            user: format!("{:.2}", self.usr as f32),
        })
    }
}

/// Converts `mpstat -o JSON` output into the per-CPU shape `vmstat -P` emits.
///
/// Only the first host and its first sample are read; the probe is invoked
/// for a single report. The `all` aggregate row has no CPU index and is
/// skipped.
pub fn parse_mpstat(text: &str) -> CpuLoadSummary {
    let raw: MpstatOutput = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, "mpstat output is not valid JSON");
            return CpuLoadSummary::default();
        }
    };

    let cpu = raw
        .sysstat
        .hosts
        .first()
        .and_then(|host| host.statistics.first())
        .map(|sample| {
            sample
                .cpu_load
                .iter()
                .filter_map(MpstatCpu::to_cpu_load)
                .collect()
        })
        .unwrap_or_default();

    CpuLoadSummary { cpu }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MPSTAT: &str = r#"{"sysstat": {
        "hosts": [
            {
                "nodename": "truenas",
                "sysname": "Linux",
                "number-of-cpus": 2,
                "statistics": [
                    {
                        "timestamp": "10:15:01",
                        "cpu-load": [
                            {"cpu": "all", "usr": 3.0, "nice": 0.0, "sys": 1.0, "iowait": 0.0, "idle": 96.0},
                            {"cpu": "0", "usr": 4.255, "nice": 0.0, "sys": 1.5, "iowait": 0.25, "idle": 93.99},
                            {"cpu": "1", "usr": 1.0, "nice": 0.0, "sys": 0.333, "iowait": 0.0, "idle": 98.667}
                        ]
                    },
                    {
                        "timestamp": "10:15:02",
                        "cpu-load": [
                            {"cpu": "0", "usr": 50.0, "sys": 50.0, "idle": 0.0}
                        ]
                    }
                ]
            }
        ]
    }}"#;

    #[test]
    fn passthrough_preserves_structure() {
        let text = r#"{"memory": {"active": 12, "pages": [1, 2, 3]}}"#;
        let value = parse_passthrough(text).expect("valid json");
        assert_eq!(value, json!({"memory": {"active": 12, "pages": [1, 2, 3]}}));
    }

    #[test]
    fn passthrough_rejects_garbage_and_empty_input() {
        assert!(parse_passthrough("").is_none());
        assert!(parse_passthrough("  \n").is_none());
        assert!(parse_passthrough("vmstat: illegal option -- -").is_none());
        assert!(parse_passthrough("null").is_none());
    }

    #[test]
    fn mpstat_converts_first_sample_per_cpu() {
        let summary = parse_mpstat(MPSTAT);
        assert_eq!(
            summary.cpu,
            vec![
                CpuLoad {
                    idle: "93.99".to_string(),
                    name: 0,
                    system: "1.50".to_string(),
                    user: "4.26".to_string(),
                },
                CpuLoad {
                    idle: "98.67".to_string(),
                    name: 1,
                    system: "0.33".to_string(),
                    user: "1.00".to_string(),
                },
            ]
        );
    }

    #[test]
    fn mpstat_tolerates_missing_wrappers() {
        assert!(parse_mpstat(r#"{"sysstat": {"hosts": []}}"#).cpu.is_empty());
        assert!(parse_mpstat("{}").cpu.is_empty());
        assert!(parse_mpstat("not json").cpu.is_empty());
    }
}
