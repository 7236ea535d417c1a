use super::fields;
use crate::snapshot::{MemorySummary, VmstatMemory};

/// Parses procps `vmstat -s -S K` into the FreeBSD memory summary shape.
///
/// Only `<value> K <label> memory|swap` lines are read; values are converted
/// from KiB to bytes. The buffer figure stands in for wired memory.
pub fn parse_vmstat_memory(text: &str) -> VmstatMemory {
    let mut summary = MemorySummary::default();

    for line in text.lines() {
        let words = fields(line);
        if words.len() != 4 || words[1] != "K" {
            continue;
        }
        let Ok(kib) = words[0].parse::<f64>() else {
            continue;
        };
        let bytes = kib * 1024.0;

        match (words[3], words[2]) {
            ("memory", "active") => summary.active_bytes = bytes,
            ("memory", "inactive") => summary.inactive_bytes = bytes,
            ("memory", "free") => summary.free_bytes = bytes,
            ("memory", "buffer") => summary.wired_bytes = bytes,
            ("memory", "total") => summary.total_bytes = bytes,
            ("swap", "total") => summary.swap_total_bytes = bytes,
            ("swap", "used") => summary.swap_used_bytes = bytes,
            ("swap", "free") => summary.swap_free_bytes = bytes,
            _ => {}
        }
    }

    VmstatMemory { summary }
}
