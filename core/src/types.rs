//! Input records for the configuration document builder.
//!
//! # Design
//! Plain owned data, populated by the caller (or deserialized from JSON)
//! before a document is built. Empty strings, zero numbers and empty lists
//! mean "not set" and are left out of the produced document.

use serde::{Deserialize, Serialize};

/// One `option-data` entry. `name` wins over `code` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OptionData {
    pub name: String,
    pub code: u16,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp4Pool {
    /// Address range, e.g. `192.0.2.10 - 192.0.2.100`.
    pub pool: String,
    pub client_class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp4Reservation {
    pub hw_address: String,
    pub client_id: String,
    pub ip_address: String,
    pub hostname: String,
    pub client_class: String,
    pub option_data: Vec<OptionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp4Subnet {
    pub id: u32,
    /// CIDR, e.g. `192.0.2.0/24`.
    pub subnet: String,
    pub valid_lifetime: u32,
    pub renew_timer: u32,
    pub rebind_timer: u32,
    pub pools: Vec<Dhcp4Pool>,
    pub option_data: Vec<OptionData>,
    pub reservations: Vec<Dhcp4Reservation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SharedNetwork {
    pub name: String,
    pub interface: String,
    pub subnets: Vec<Dhcp4Subnet>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp6Pool {
    pub pool: String,
    pub client_class: String,
}

/// Prefix-delegation pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp6PdPool {
    pub prefix: String,
    pub prefix_len: u8,
    pub delegated_len: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp6Reservation {
    pub duid: String,
    pub hw_address: String,
    pub ip_addresses: Vec<String>,
    pub prefixes: Vec<String>,
    pub hostname: String,
    pub client_class: String,
    pub option_data: Vec<OptionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp6Subnet {
    pub id: u32,
    pub subnet: String,
    pub interface: String,
    pub preferred_lifetime: u32,
    pub valid_lifetime: u32,
    pub renew_timer: u32,
    pub rebind_timer: u32,
    pub pools: Vec<Dhcp6Pool>,
    pub pd_pools: Vec<Dhcp6PdPool>,
    pub option_data: Vec<OptionData>,
    pub reservations: Vec<Dhcp6Reservation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp6SharedNetwork {
    pub name: String,
    pub interface: String,
    pub subnets: Vec<Dhcp6Subnet>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientClass {
    pub name: String,
    /// Classification expression, e.g. `substring(option[60].hex,0,6) == 'docsis'`.
    pub test: String,
    pub option_data: Vec<OptionData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LeaseDatabase {
    #[serde(rename = "type")]
    pub db_type: String,
    pub name: String,
    pub persist: bool,
    pub lfc_interval: u32,
}

impl Default for LeaseDatabase {
    fn default() -> Self {
        Self {
            db_type: "memfile".to_string(),
            name: String::new(),
            persist: true,
            lfc_interval: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ControlSocket {
    pub socket_type: String,
    pub socket_name: String,
}

/// DHCPv4-specific globals and topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp4Settings {
    pub valid_lifetime: u32,
    pub renew_timer: u32,
    pub rebind_timer: u32,
    pub option_data: Vec<OptionData>,
    pub client_classes: Vec<ClientClass>,
    /// Used instead of `subnets` when present with a non-empty name.
    pub shared_network: Option<SharedNetwork>,
    pub subnets: Vec<Dhcp4Subnet>,
}

/// DHCPv6-specific globals and topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dhcp6Settings {
    pub preferred_lifetime: u32,
    pub valid_lifetime: u32,
    pub renew_timer: u32,
    pub rebind_timer: u32,
    pub option_data: Vec<OptionData>,
    pub client_classes: Vec<ClientClass>,
    pub shared_network: Option<Dhcp6SharedNetwork>,
    pub subnets: Vec<Dhcp6Subnet>,
}

/// Everything needed to build a `Dhcp4` or `Dhcp6` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigData {
    pub interfaces: Vec<String>,
    pub authoritative: bool,
    pub lease_database: LeaseDatabase,
    pub control_socket: Option<ControlSocket>,
    pub hooks_libraries: Vec<String>,
    pub dhcp4: Dhcp4Settings,
    pub dhcp6: Dhcp6Settings,
}
