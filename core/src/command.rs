//! Closed set of control-agent commands and their wire names.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Service name of the DHCPv4 engine.
pub const DHCP4: &str = "dhcp4";
/// Service name of the DHCPv6 engine.
pub const DHCP6: &str = "dhcp6";

/// Every command the typed surface can send.
///
/// The wire protocol is string-keyed; the name is produced only when the
/// envelope is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter)]
pub enum Command {
    #[strum(serialize = "list-commands")]
    ListCommands,
    #[strum(serialize = "version-get")]
    VersionGet,
    #[strum(serialize = "status-get")]
    StatusGet,
    #[strum(serialize = "shutdown")]
    Shutdown,
    #[strum(serialize = "build-report")]
    BuildReport,

    #[strum(serialize = "config-get")]
    ConfigGet,
    #[strum(serialize = "config-set")]
    ConfigSet,
    #[strum(serialize = "config-reload")]
    ConfigReload,
    #[strum(serialize = "config-test")]
    ConfigTest,
    #[strum(serialize = "config-write")]
    ConfigWrite,
    #[strum(serialize = "config-backend-pull")]
    ConfigBackendPull,
    #[strum(serialize = "config-hash-get")]
    ConfigHashGet,
    #[strum(serialize = "server-tag-get")]
    ServerTagGet,

    #[strum(serialize = "subnet4-list")]
    Subnet4List,
    #[strum(serialize = "subnet4-get")]
    Subnet4Get,
    #[strum(serialize = "subnet4-add")]
    Subnet4Add,
    #[strum(serialize = "subnet4-del")]
    Subnet4Del,
    #[strum(serialize = "subnet4-update")]
    Subnet4Update,
    #[strum(serialize = "subnet6-list")]
    Subnet6List,
    #[strum(serialize = "subnet6-get")]
    Subnet6Get,
    #[strum(serialize = "subnet6-add")]
    Subnet6Add,
    #[strum(serialize = "subnet6-del")]
    Subnet6Del,
    #[strum(serialize = "subnet6-update")]
    Subnet6Update,

    #[strum(serialize = "lease4-add")]
    Lease4Add,
    #[strum(serialize = "lease4-del")]
    Lease4Del,
    #[strum(serialize = "lease4-get")]
    Lease4Get,
    #[strum(serialize = "lease4-get-by-hw-address")]
    Lease4GetByHwAddress,
    #[strum(serialize = "lease4-get-by-client-id")]
    Lease4GetByClientId,
    #[strum(serialize = "lease4-get-all")]
    Lease4GetAll,
    #[strum(serialize = "lease4-wipe")]
    Lease4Wipe,
    #[strum(serialize = "lease6-add")]
    Lease6Add,
    #[strum(serialize = "lease6-del")]
    Lease6Del,
    #[strum(serialize = "lease6-get")]
    Lease6Get,
    #[strum(serialize = "lease6-get-by-duid")]
    Lease6GetByDuid,
    #[strum(serialize = "lease6-get-all")]
    Lease6GetAll,
    #[strum(serialize = "lease6-wipe")]
    Lease6Wipe,

    #[strum(serialize = "reservation-add")]
    ReservationAdd,
    #[strum(serialize = "reservation-del")]
    ReservationDel,
    #[strum(serialize = "reservation-get-by-address")]
    ReservationGetByAddress,
    #[strum(serialize = "reservation-get-all")]
    ReservationGetAll,

    #[strum(serialize = "statistic-get")]
    StatisticGet,
    #[strum(serialize = "statistic-get-all")]
    StatisticGetAll,
    #[strum(serialize = "statistic-reset")]
    StatisticReset,
    #[strum(serialize = "statistic-reset-all")]
    StatisticResetAll,
    #[strum(serialize = "statistic-remove")]
    StatisticRemove,
    #[strum(serialize = "statistic-remove-all")]
    StatisticRemoveAll,

    #[strum(serialize = "class-add")]
    ClassAdd,
    #[strum(serialize = "class-del")]
    ClassDel,
    #[strum(serialize = "class-list")]
    ClassList,

    #[strum(serialize = "cache-clear")]
    CacheClear,
    #[strum(serialize = "cache-size")]
    CacheSize,
    #[strum(serialize = "cache-get")]
    CacheGet,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
