//! Platform probe tables.
//!
//! TrueNAS CORE runs FreeBSD and its tools speak libxo JSON; TrueNAS SCALE
//! runs Linux, where memory and CPU come from procps and sysstat instead.
//! The remaining probes are issued identically everywhere and simply come
//! back empty where the tool does not exist.

use super::{Field, ProbeValue};
use crate::config::Config;
use crate::parsers::json::{parse_mpstat, parse_passthrough};
use crate::parsers::memory::parse_vmstat_memory;
use crate::parsers::services::{parse_smbstatus, parse_sockstat, ConnectionPolicy};
use crate::parsers::sysctl::{parse_sysctl, SysctlKey};
use crate::parsers::tables::{parse_arcstat, parse_gstat, parse_ifstat};
use crate::parsers::decode_stdout;
use crate::snapshot::ProbeDocument;
use std::path::Path;

const NFS_PORT: &str = "2049";
const ISCSI_PORT: &str = "3260";
const PS_COLUMNS: &str = "pid,ppid,jail,jid,%cpu,systime,%mem,vsz,rss,state,nlwp,comm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    FreeBsd,
    Linux,
    Unsupported,
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "freebsd" => Platform::FreeBsd,
            "linux" => Platform::Linux,
            _ => Platform::Unsupported,
        }
    }

    /// Per-platform default for counting NFS and iSCSI clients; every profile
    /// currently excludes the listening row.
    fn default_connection_policy(self) -> ConnectionPolicy {
        match self {
            Platform::FreeBsd | Platform::Linux | Platform::Unsupported => {
                ConnectionPolicy::ExcludeListening
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineClass {
    Long,
    Short,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParserKind {
    Passthrough,
    VmstatMemory,
    Mpstat,
    Gstat,
    Arcstat,
    Ifstat,
    Sysctl {
        filter: Option<String>,
        key: SysctlKey,
    },
    Smbstatus,
    Sockstat(ConnectionPolicy),
}

impl ParserKind {
    pub fn parse(&self, stdout: &[u8]) -> ProbeValue {
        let text = decode_stdout(stdout);
        match self {
            ParserKind::Passthrough => match parse_passthrough(&text) {
                Some(value) => ProbeValue::Document(ProbeDocument::Opaque(value)),
                None => ProbeValue::Absent,
            },
            ParserKind::VmstatMemory => {
                ProbeValue::Document(ProbeDocument::Memory(parse_vmstat_memory(&text)))
            }
            ParserKind::Mpstat => ProbeValue::Document(ProbeDocument::Cpu(parse_mpstat(&text))),
            ParserKind::Gstat => ProbeValue::DiskIo(parse_gstat(&text)),
            ParserKind::Arcstat => ProbeValue::Arc(parse_arcstat(&text)),
            ParserKind::Ifstat => ProbeValue::Interfaces(parse_ifstat(&text)),
            ParserKind::Sysctl { filter, key } => {
                ProbeValue::Sensors(parse_sysctl(&text, filter.as_deref(), *key))
            }
            ParserKind::Smbstatus => ProbeValue::Service(parse_smbstatus(&text)),
            ParserKind::Sockstat(policy) => ProbeValue::Service(parse_sockstat(&text, *policy)),
        }
    }
}

/// One logical probe: where its result goes, what to run, how to read it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSpec {
    pub field: Field,
    pub program: String,
    pub args: Vec<String>,
    pub parser: ParserKind,
    pub deadline: DeadlineClass,
}

impl ProbeSpec {
    pub fn new(field: Field, program: &str, args: &[&str], parser: ParserKind) -> Self {
        Self {
            field,
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            parser,
            deadline: DeadlineClass::Long,
        }
    }

    pub fn with_deadline(mut self, deadline: DeadlineClass) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Host-dependent inputs to the probe tables, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOptions {
    pub arcstat_program: String,
    pub temperature_filter: String,
    pub nfs_policy: Option<ConnectionPolicy>,
    pub iscsi_policy: Option<ConnectionPolicy>,
}

impl ProfileOptions {
    pub fn from_config(cfg: &Config) -> Self {
        // FreeNAS 11.3 and older only ship the Python script.
        let arcstat_program = if Path::new(&cfg.arcstat_legacy_path).exists() {
            "arcstat.py"
        } else {
            "arcstat"
        };
        Self {
            arcstat_program: arcstat_program.to_string(),
            temperature_filter: cfg.temperature_filter.clone(),
            nfs_policy: cfg.services.nfs_policy,
            iscsi_policy: cfg.services.iscsi_policy,
        }
    }
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            arcstat_program: "arcstat".to_string(),
            temperature_filter: "temperature".to_string(),
            nfs_policy: None,
            iscsi_policy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub platform: Platform,
    pub probes: Vec<ProbeSpec>,
}

impl Profile {
    pub fn for_platform(platform: Platform, options: &ProfileOptions) -> Self {
        let mut probes = platform_probes(platform);
        probes.extend(common_probes(platform, options));
        Self { platform, probes }
    }
}

fn platform_probes(platform: Platform) -> Vec<ProbeSpec> {
    match platform {
        Platform::FreeBsd => vec![
            ProbeSpec::new(
                Field::Memory,
                "vmstat",
                &["-s", "--libxo", "json"],
                ParserKind::Passthrough,
            ),
            ProbeSpec::new(
                Field::Cpu,
                "vmstat",
                &["-P", "-c", "2", "--libxo", "json"],
                ParserKind::Passthrough,
            ),
        ],
        Platform::Linux => vec![
            ProbeSpec::new(
                Field::Memory,
                "vmstat",
                &["-s", "-S", "K"],
                ParserKind::VmstatMemory,
            ),
            ProbeSpec::new(
                Field::Cpu,
                "mpstat",
                &["-u", "-P", "0-", "-o", "JSON"],
                ParserKind::Mpstat,
            ),
        ],
        Platform::Unsupported => Vec::new(),
    }
}

fn common_probes(platform: Platform, options: &ProfileOptions) -> Vec<ProbeSpec> {
    let nfs_policy = options
        .nfs_policy
        .unwrap_or_else(|| platform.default_connection_policy());
    let iscsi_policy = options
        .iscsi_policy
        .unwrap_or_else(|| platform.default_connection_policy());

    vec![
        // netstat and ifstat both integrate traffic over one second.
        ProbeSpec::new(
            Field::NetworkCounters,
            "netstat",
            &["-i", "-s", "--libxo", "json"],
            ParserKind::Passthrough,
        ),
        ProbeSpec::new(
            Field::InterfaceRates,
            "ifstat",
            &["-a", "-T", "-b", "1", "1"],
            ParserKind::Ifstat,
        ),
        ProbeSpec::new(
            Field::Processes,
            "ps",
            &["--libxo", "json", "-ax", "-o", PS_COLUMNS],
            ParserKind::Passthrough,
        ),
        ProbeSpec::new(Field::DiskIo, "gstat", &["-bps"], ParserKind::Gstat),
        ProbeSpec::new(Field::Arc, &options.arcstat_program, &[], ParserKind::Arcstat),
        ProbeSpec::new(
            Field::Temperatures,
            "sysctl",
            &["-q", "dev.cpu"],
            ParserKind::Sysctl {
                filter: Some(options.temperature_filter.clone()),
                key: SysctlKey::Sensor,
            },
        ),
        ProbeSpec::new(Field::Smb, "smbstatus", &["-b"], ParserKind::Smbstatus),
        ProbeSpec::new(
            Field::Nfs,
            "sockstat",
            &["-P", "tcp", "-4", "-p", NFS_PORT],
            ParserKind::Sockstat(nfs_policy),
        )
        .with_deadline(DeadlineClass::Short),
        ProbeSpec::new(
            Field::Iscsi,
            "sockstat",
            &["-P", "tcp", "-4", "-p", ISCSI_PORT],
            ParserKind::Sockstat(iscsi_policy),
        )
        .with_deadline(DeadlineClass::Short),
    ]
}
