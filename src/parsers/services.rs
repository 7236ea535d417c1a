use crate::snapshot::ServiceSummary;
use serde::{Deserialize, Serialize};

const WILDCARD_ADDRESS: &str = "*:*";

/// Which `sockstat` rows count as connected clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionPolicy {
    /// Skip rows whose foreign address is `*:*` (the listening socket).
    #[default]
    ExcludeListening,
    /// Count every socket row, listening or not.
    AllRows,
}

/// Counts sessions in `smbstatus -b` output.
///
/// ```text
/// Samba version 4.12.1
/// PID     Username     Group        Machine                                   Protocol Version
/// ----------------------------------------------------------------------------------------------
/// 38807   aervin       aervin       computron9000 (ipv4:192.168.1.232:57030)  NT1
/// ```
///
/// Every non-empty line after the first dashed divider is one client; later
/// dividers are not.
pub fn parse_smbstatus(text: &str) -> ServiceSummary {
    let client_count = text
        .lines()
        .skip_while(|line| !line.starts_with("--"))
        .skip(1)
        .filter(|line| !line.trim().is_empty() && !line.starts_with("--"))
        .count();

    ServiceSummary {
        client_count: client_count as u32,
    }
}

/// Counts connections in `sockstat -P tcp -4 -p <port>` output.
///
/// ```text
/// USER     COMMAND    PID   FD PROTO  LOCAL ADDRESS         FOREIGN ADDRESS
/// root     nfsd       52019 5  tcp4   *:2049                *:*
/// ?        ?          ?     ?  tcp4   10.234.6.111:2049     10.234.6.44:793
/// ```
///
/// The same remote address may hold several connections; each row counts.
pub fn parse_sockstat(text: &str, policy: ConnectionPolicy) -> ServiceSummary {
    let client_count = text
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| match policy {
            ConnectionPolicy::ExcludeListening => !line.contains(WILDCARD_ADDRESS),
            ConnectionPolicy::AllRows => true,
        })
        .count();

    ServiceSummary {
        client_count: client_count as u32,
    }
}
