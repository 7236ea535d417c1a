use super::{fields, number};
use crate::snapshot::{ArcSummary, DiskIoRecord, InterfaceRate};

const GSTAT_HEADER_LINES: usize = 2;
const GSTAT_FIELDS: usize = 12;

/// Parses `gstat -bps` batch output.
///
/// ```text
/// dT: 1.005s  w: 1.000s
///  L(q)  ops/s    r/s     kB   kBps   ms/r    w/s     kB   kBps   ms/w   %busy Name
///     0      0      0      0      0    0.0      0      0      0    0.0    0.0  ada0
///    72    540      0      0      0    0.0    540    128  69155  135.7  100.0  ada1
/// ```
///
/// The column header has twelve tokens as well, so the leading lines are
/// skipped by position rather than by shape.
pub fn parse_gstat(text: &str) -> Vec<DiskIoRecord> {
    text.lines()
        .skip(GSTAT_HEADER_LINES)
        .filter_map(|line| {
            let f = fields(line);
            if f.len() != GSTAT_FIELDS {
                return None;
            }
            Some(DiskIoRecord {
                queue_length: number(f[0]),
                ops_per_sec: number(f[1]),
                reads_per_sec: number(f[2]),
                read_kb: number(f[3]),
                read_kbps: number(f[4]),
                read_latency_ms: number(f[5]),
                writes_per_sec: number(f[6]),
                write_kb: number(f[7]),
                write_kbps: number(f[8]),
                write_latency_ms: number(f[9]),
                busy_percent: number(f[10]),
                name: f[11].to_string(),
            })
        })
        .collect()
}

/// Parses a single `arcstat` sample.
///
/// Columns are located by their header label, so upstream reordering or new
/// columns do not shift values into the wrong fields.
pub fn parse_arcstat(text: &str) -> ArcSummary {
    let mut lines = text.lines().map(fields).filter(|f| !f.is_empty());
    let mut out = ArcSummary::default();

    let Some(labels) = lines.next() else {
        return out;
    };
    let Some(values) = lines.next() else {
        return out;
    };

    for (label, value) in labels.iter().zip(values.iter()) {
        match *label {
            "read" => out.read = number(value),
            "miss" => out.miss = number(value),
            "miss%" => out.miss_percent = number(value),
            "dmis" => out.dmis = number(value),
            "dm%" => out.dmis_percent = number(value),
            "pmis" => out.pmis = number(value),
            "pm%" => out.pmis_percent = number(value),
            "mmis" => out.mmis = number(value),
            "mm%" => out.mmis_percent = number(value),
            "arcsz" => out.arcsz = value.to_string(),
            "c" => out.c = value.to_string(),
            _ => {}
        }
    }

    out
}

/// Parses `ifstat -a -T` output: a row of interface names, then rows holding
/// an (in, out) pair per interface in label order.
///
/// The unit header row carries four tokens per interface and is dropped by
/// the field count check like any other malformed row.
pub fn parse_ifstat(text: &str) -> Vec<InterfaceRate> {
    let mut lines = text.lines().map(fields).filter(|f| !f.is_empty());
    let Some(labels) = lines.next() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for row in lines {
        if row.len() != labels.len() * 2 {
            continue;
        }
        for (i, name) in labels.iter().enumerate() {
            out.push(InterfaceRate {
                name: name.to_string(),
                in_kbps: row[i * 2].to_string(),
                out_kbps: row[i * 2 + 1].to_string(),
            });
        }
    }
    out
}
