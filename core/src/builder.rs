//! Configuration document builder.
//!
//! # Design
//! Every builder returns an owned `serde_json::Value` or a `BuildError`.
//! `attach` consumes the child, so a node belongs to exactly one parent once
//! attached and a half-built node is simply dropped on the error path. A
//! failure anywhere aborts the whole document: list builders never return
//! partial arrays, and a failed subnet discards every sibling built before
//! it. Empty inputs are omitted rather than emitted as empty values.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::BuildError;
use crate::types::{
    ClientClass, ConfigData, ControlSocket, Dhcp4Pool, Dhcp4Reservation, Dhcp4Subnet, Dhcp6PdPool,
    Dhcp6Pool, Dhcp6Reservation, Dhcp6SharedNetwork, Dhcp6Subnet, LeaseDatabase, OptionData,
    SharedNetwork,
};

pub type BuildResult = Result<Value, BuildError>;

/// Attach `child` to `parent` under `key`, or append it when `key` is `None`.
///
/// A failed child is logged with the slot it was meant for and its error is
/// returned. A parent that cannot hold the child (not an object when a key
/// is given, not an array otherwise) drops the child and fails.
pub fn attach(parent: &mut Value, key: Option<&str>, child: BuildResult) -> Result<(), BuildError> {
    let slot = match key {
        Some(key) => format!("'{key}'"),
        None => format!("element {}", parent.as_array().map_or(0, Vec::len)),
    };
    let child = child.inspect_err(|err| warn!(%slot, error = %err, "failed to build child"))?;

    match (parent, key) {
        (Value::Object(map), Some(key)) => {
            map.insert(key.to_string(), child);
            Ok(())
        }
        (Value::Array(items), None) => {
            items.push(child);
            Ok(())
        }
        _ => {
            warn!(%slot, "parent cannot hold child");
            Err(BuildError::Attach { slot })
        }
    }
}

fn object() -> Value {
    Value::Object(Map::new())
}

fn required(record: &'static str, field: &'static str, value: &str) -> BuildResult {
    if value.is_empty() {
        return Err(BuildError::MissingField { record, field });
    }
    Ok(json!(value))
}

fn attach_str(node: &mut Value, key: &str, value: &str) -> Result<(), BuildError> {
    if value.is_empty() {
        return Ok(());
    }
    attach(node, Some(key), Ok(json!(value)))
}

fn attach_number(node: &mut Value, key: &str, value: u32) -> Result<(), BuildError> {
    if value == 0 {
        return Ok(());
    }
    attach(node, Some(key), Ok(json!(value)))
}

fn attach_strings(node: &mut Value, key: &str, values: &[String]) -> Result<(), BuildError> {
    if values.is_empty() {
        return Ok(());
    }
    attach(node, Some(key), Ok(json!(values)))
}

/// Build an array from `items`, all or nothing.
fn build_array<I>(items: &[I], build: impl Fn(&I) -> BuildResult) -> BuildResult {
    let mut array = Value::Array(Vec::with_capacity(items.len()));
    for item in items {
        attach(&mut array, None, build(item))?;
    }
    Ok(array)
}

/// Attach the array built from `items` under `key`, skipping empty lists.
fn attach_list<I>(
    node: &mut Value,
    key: &str,
    items: &[I],
    build: impl Fn(&I) -> BuildResult,
) -> Result<(), BuildError> {
    if items.is_empty() {
        return Ok(());
    }
    attach(node, Some(key), build_array(items, build))
}

// --- shared pieces ---

pub fn build_option(option: &OptionData) -> BuildResult {
    let mut node = object();
    if !option.name.is_empty() {
        attach(&mut node, Some("name"), Ok(json!(option.name)))?;
    } else if option.code > 0 {
        attach(&mut node, Some("code"), Ok(json!(option.code)))?;
    } else {
        return Err(BuildError::OptionKey);
    }
    attach_str(&mut node, "data", &option.data)?;
    Ok(node)
}

pub fn build_option_array(options: &[OptionData]) -> BuildResult {
    build_array(options, build_option)
}

pub fn build_client_class(class: &ClientClass) -> BuildResult {
    let mut node = object();
    attach(&mut node, Some("name"), required("client class", "name", &class.name))?;
    attach_str(&mut node, "test", &class.test)?;
    attach_list(&mut node, "option-data", &class.option_data, build_option)?;
    Ok(node)
}

pub fn build_lease_database(db: &LeaseDatabase) -> BuildResult {
    let mut node = object();
    attach_str(&mut node, "type", &db.db_type)?;
    attach_str(&mut node, "name", &db.name)?;
    attach(&mut node, Some("persist"), Ok(json!(db.persist)))?;
    attach_number(&mut node, "lfc-interval", db.lfc_interval)?;
    Ok(node)
}

pub fn build_control_socket(socket: &ControlSocket) -> BuildResult {
    let mut node = object();
    attach(
        &mut node,
        Some("socket-type"),
        required("control socket", "socket-type", &socket.socket_type),
    )?;
    attach(
        &mut node,
        Some("socket-name"),
        required("control socket", "socket-name", &socket.socket_name),
    )?;
    Ok(node)
}

/// Server-wide settings common to both families.
fn attach_server_common(node: &mut Value, config: &ConfigData) -> Result<(), BuildError> {
    if !config.interfaces.is_empty() {
        attach(
            node,
            Some("interfaces-config"),
            Ok(json!({ "interfaces": config.interfaces })),
        )?;
    }
    attach(node, Some("lease-database"), build_lease_database(&config.lease_database))?;
    if let Some(socket) = &config.control_socket {
        attach(node, Some("control-socket"), build_control_socket(socket))?;
    }
    attach_list(node, "hooks-libraries", &config.hooks_libraries, |library| {
        required("hooks library", "library", library).map(|path| json!({ "library": path }))
    })
}

// --- DHCPv4 ---

pub fn build_pool(pool: &Dhcp4Pool) -> BuildResult {
    let mut node = object();
    attach(&mut node, Some("pool"), required("pool", "pool", &pool.pool))?;
    attach_str(&mut node, "client-class", &pool.client_class)?;
    Ok(node)
}

pub fn build_reservation(res: &Dhcp4Reservation) -> BuildResult {
    if res.hw_address.is_empty() && res.client_id.is_empty() {
        return Err(BuildError::MissingField {
            record: "reservation",
            field: "hw-address or client-id",
        });
    }
    let mut node = object();
    attach_str(&mut node, "hw-address", &res.hw_address)?;
    attach_str(&mut node, "client-id", &res.client_id)?;
    attach_str(&mut node, "ip-address", &res.ip_address)?;
    attach_str(&mut node, "hostname", &res.hostname)?;
    attach_str(&mut node, "client-class", &res.client_class)?;
    attach_list(&mut node, "option-data", &res.option_data, build_option)?;
    Ok(node)
}

/// One `subnet4` entry. The object is only handed out once fully built.
pub fn build_subnet(subnet: &Dhcp4Subnet) -> BuildResult {
    if subnet.id == 0 {
        return Err(BuildError::MissingField {
            record: "subnet4",
            field: "id",
        });
    }
    let mut node = object();
    attach(&mut node, Some("id"), Ok(json!(subnet.id)))?;
    attach(&mut node, Some("subnet"), required("subnet4", "subnet", &subnet.subnet))?;
    attach_number(&mut node, "valid-lifetime", subnet.valid_lifetime)?;
    attach_number(&mut node, "renew-timer", subnet.renew_timer)?;
    attach_number(&mut node, "rebind-timer", subnet.rebind_timer)?;
    attach_list(&mut node, "pools", &subnet.pools, build_pool)?;
    attach_list(&mut node, "option-data", &subnet.option_data, build_option)?;
    attach_list(&mut node, "reservations", &subnet.reservations, build_reservation)?;
    Ok(node)
}

pub fn build_subnet_array(subnets: &[Dhcp4Subnet]) -> BuildResult {
    build_array(subnets, build_subnet)
}

/// The `shared-networks` array holding `network`.
pub fn build_shared_network(network: &SharedNetwork) -> BuildResult {
    if network.subnets.is_empty() {
        return Err(BuildError::EmptyList {
            record: "shared network",
            field: "subnet4",
        });
    }
    let mut node = object();
    attach(&mut node, Some("name"), required("shared network", "name", &network.name))?;
    attach_str(&mut node, "interface", &network.interface)?;
    attach(&mut node, Some("subnet4"), build_subnet_array(&network.subnets))?;

    let mut array = Value::Array(Vec::with_capacity(1));
    attach(&mut array, None, Ok(node))?;
    Ok(array)
}

/// The body of a `Dhcp4` configuration, ready to pass to `config_set`.
///
/// A named shared network replaces the flat `subnet4` list; the two shapes
/// are never emitted together.
pub fn build_dhcp4_config(config: &ConfigData) -> BuildResult {
    let v4 = &config.dhcp4;
    let mut dhcp4 = object();

    if config.authoritative {
        attach(&mut dhcp4, Some("authoritative"), Ok(json!(true)))?;
    }
    attach_number(&mut dhcp4, "valid-lifetime", v4.valid_lifetime)?;
    attach_number(&mut dhcp4, "renew-timer", v4.renew_timer)?;
    attach_number(&mut dhcp4, "rebind-timer", v4.rebind_timer)?;
    attach_server_common(&mut dhcp4, config)?;
    attach_list(&mut dhcp4, "option-data", &v4.option_data, build_option)?;
    attach_list(&mut dhcp4, "client-classes", &v4.client_classes, build_client_class)?;

    match &v4.shared_network {
        Some(network) if !network.name.is_empty() => {
            attach(&mut dhcp4, Some("shared-networks"), build_shared_network(network))?;
        }
        _ => attach_list(&mut dhcp4, "subnet4", &v4.subnets, build_subnet)?,
    }
    Ok(dhcp4)
}

// --- DHCPv6 ---

pub fn build_pool6(pool: &Dhcp6Pool) -> BuildResult {
    let mut node = object();
    attach(&mut node, Some("pool"), required("pool6", "pool", &pool.pool))?;
    attach_str(&mut node, "client-class", &pool.client_class)?;
    Ok(node)
}

pub fn build_pd_pool(pool: &Dhcp6PdPool) -> BuildResult {
    if pool.prefix_len == 0 || pool.delegated_len == 0 {
        return Err(BuildError::MissingField {
            record: "pd-pool",
            field: "prefix-len or delegated-len",
        });
    }
    let mut node = object();
    attach(&mut node, Some("prefix"), required("pd-pool", "prefix", &pool.prefix))?;
    attach(&mut node, Some("prefix-len"), Ok(json!(pool.prefix_len)))?;
    attach(&mut node, Some("delegated-len"), Ok(json!(pool.delegated_len)))?;
    Ok(node)
}

pub fn build_reservation6(res: &Dhcp6Reservation) -> BuildResult {
    if res.duid.is_empty() && res.hw_address.is_empty() {
        return Err(BuildError::MissingField {
            record: "reservation6",
            field: "duid or hw-address",
        });
    }
    let mut node = object();
    attach_str(&mut node, "duid", &res.duid)?;
    attach_str(&mut node, "hw-address", &res.hw_address)?;
    attach_strings(&mut node, "ip-addresses", &res.ip_addresses)?;
    attach_strings(&mut node, "prefixes", &res.prefixes)?;
    attach_str(&mut node, "hostname", &res.hostname)?;
    attach_str(&mut node, "client-class", &res.client_class)?;
    attach_list(&mut node, "option-data", &res.option_data, build_option)?;
    Ok(node)
}

pub fn build_subnet6(subnet: &Dhcp6Subnet) -> BuildResult {
    if subnet.id == 0 {
        return Err(BuildError::MissingField {
            record: "subnet6",
            field: "id",
        });
    }
    let mut node = object();
    attach(&mut node, Some("id"), Ok(json!(subnet.id)))?;
    attach(&mut node, Some("subnet"), required("subnet6", "subnet", &subnet.subnet))?;
    attach_str(&mut node, "interface", &subnet.interface)?;
    attach_number(&mut node, "preferred-lifetime", subnet.preferred_lifetime)?;
    attach_number(&mut node, "valid-lifetime", subnet.valid_lifetime)?;
    attach_number(&mut node, "renew-timer", subnet.renew_timer)?;
    attach_number(&mut node, "rebind-timer", subnet.rebind_timer)?;
    attach_list(&mut node, "pools", &subnet.pools, build_pool6)?;
    attach_list(&mut node, "pd-pools", &subnet.pd_pools, build_pd_pool)?;
    attach_list(&mut node, "option-data", &subnet.option_data, build_option)?;
    attach_list(&mut node, "reservations", &subnet.reservations, build_reservation6)?;
    Ok(node)
}

pub fn build_subnet6_array(subnets: &[Dhcp6Subnet]) -> BuildResult {
    build_array(subnets, build_subnet6)
}

pub fn build_shared_network6(network: &Dhcp6SharedNetwork) -> BuildResult {
    if network.subnets.is_empty() {
        return Err(BuildError::EmptyList {
            record: "shared network",
            field: "subnet6",
        });
    }
    let mut node = object();
    attach(&mut node, Some("name"), required("shared network", "name", &network.name))?;
    attach_str(&mut node, "interface", &network.interface)?;
    attach(&mut node, Some("subnet6"), build_subnet6_array(&network.subnets))?;

    let mut array = Value::Array(Vec::with_capacity(1));
    attach(&mut array, None, Ok(node))?;
    Ok(array)
}

/// The body of a `Dhcp6` configuration. Mirrors `build_dhcp4_config`,
/// without `authoritative`.
pub fn build_dhcp6_config(config: &ConfigData) -> BuildResult {
    let v6 = &config.dhcp6;
    let mut dhcp6 = object();

    attach_number(&mut dhcp6, "preferred-lifetime", v6.preferred_lifetime)?;
    attach_number(&mut dhcp6, "valid-lifetime", v6.valid_lifetime)?;
    attach_number(&mut dhcp6, "renew-timer", v6.renew_timer)?;
    attach_number(&mut dhcp6, "rebind-timer", v6.rebind_timer)?;
    attach_server_common(&mut dhcp6, config)?;
    attach_list(&mut dhcp6, "option-data", &v6.option_data, build_option)?;
    attach_list(&mut dhcp6, "client-classes", &v6.client_classes, build_client_class)?;

    match &v6.shared_network {
        Some(network) if !network.name.is_empty() => {
            attach(&mut dhcp6, Some("shared-networks"), build_shared_network6(network))?;
        }
        _ => attach_list(&mut dhcp6, "subnet6", &v6.subnets, build_subnet6)?,
    }
    Ok(dhcp6)
}
