use std::collections::BTreeMap;

/// How the output key is derived from a dotted sysctl name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysctlKey {
    /// `kstat.zfs.misc.arcstats.size: 123` keys on `size`.
    Leaf,
    /// `dev.cpu.3.temperature: 41.0C` keys on `3` and drops the unit suffix.
    Sensor,
}

/// Parses `sysctl` name/value dumps.
///
/// Lines that do not split into exactly one name and one value on `": "` are
/// ignored, as are names not containing `filter` when one is given.
pub fn parse_sysctl(text: &str, filter: Option<&str>, key: SysctlKey) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    for line in text.lines() {
        let parts: Vec<&str> = line.split(": ").collect();
        let &[name, value] = parts.as_slice() else {
            continue;
        };
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            if !name.contains(filter) {
                continue;
            }
        }

        let segments: Vec<&str> = name.split('.').collect();
        match key {
            SysctlKey::Leaf => {
                if let Some(leaf) = segments.last() {
                    out.insert(leaf.to_string(), value.to_string());
                }
            }
            SysctlKey::Sensor => {
                if segments.len() < 2 {
                    continue;
                }
                let sensor = segments[segments.len() - 2];
                let reading = value.strip_suffix('C').unwrap_or(value);
                out.insert(sensor.to_string(), reading.to_string());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_CPU: &str = "dev.cpu.0.%desc: ACPI CPU
dev.cpu.0.temperature: 45.0C
dev.cpu.0.freq: 2400
dev.cpu.1.temperature: 47.0C
dev.cpu.1.%parent: acpi0
";

    #[test]
    fn sensor_keys_use_the_device_index() {
        let temps = parse_sysctl(DEV_CPU, Some("temperature"), SysctlKey::Sensor);
        assert_eq!(temps.len(), 2);
        assert_eq!(temps["0"], "45.0");
        assert_eq!(temps["1"], "47.0");
    }

    #[test]
    fn leaf_keys_keep_values_verbatim() {
        let text = "kstat.zfs.misc.arcstats.size: 1717986918
kstat.zfs.misc.arcstats.c_max: 4294967296
vfs.zfs.version.spa: 5000
";
        let stats = parse_sysctl(text, Some("arcstats"), SysctlKey::Leaf);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["size"], "1717986918");
        assert_eq!(stats["c_max"], "4294967296");
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let stats = parse_sysctl("a.b: 1\nc.d: 2\n", Some(""), SysctlKey::Leaf);
        assert_eq!(stats.len(), 2);
        let stats = parse_sysctl("a.b: 1\nc.d: 2\n", None, SysctlKey::Leaf);
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = "no delimiter here
kern.hostname:truenas
kern.msg: a: b
temperature: 40.0C
";
        assert!(parse_sysctl(text, None, SysctlKey::Sensor).is_empty());
        let leaf = parse_sysctl(text, None, SysctlKey::Leaf);
        assert_eq!(leaf.len(), 1);
        assert_eq!(leaf["temperature"], "40.0C");
    }
}
