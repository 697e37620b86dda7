//! Typed command surface.
//!
//! Each method checks its required parameters locally, shapes the
//! `arguments` document, and hands off to `execute_transaction`. DHCPv4
//! commands always target `dhcp4` and DHCPv6 commands `dhcp6`; the rest
//! take the service from the caller. Documents the caller passes by
//! reference are deep-copied, so the caller's copy stays independent.

use serde_json::{json, Value};

use crate::command::{Command, DHCP4, DHCP6};
use crate::context::TransactionContext;
use crate::error::{CtrlError, Result};
use crate::http::Transport;
use crate::protocol::CommandResponse;

/// Longest wrapper key `config_set`/`config_test` will produce, in bytes.
pub const SERVICE_KEY_MAX: usize = 63;

/// Wrapper key for a service's configuration: `dhcp4` becomes `Dhcp4`.
pub fn service_key(service: &str) -> String {
    let mut end = service.len().min(SERVICE_KEY_MAX);
    while !service.is_char_boundary(end) {
        end -= 1;
    }
    let mut chars = service[..end].chars();
    let mut key = String::with_capacity(end);
    if let Some(first) = chars.next() {
        key.push(first.to_ascii_uppercase());
        key.push_str(chars.as_str());
    }
    key
}

impl<T: Transport> TransactionContext<T> {
    fn send(
        &mut self,
        command: Command,
        services: &[&str],
        arguments: Option<Value>,
    ) -> Result<CommandResponse> {
        self.execute_transaction(command.as_str(), services, arguments)
    }

    fn require(&mut self, value: &str, name: &str) -> Result<()> {
        if value.is_empty() {
            return Err(self.fail(CtrlError::Precondition(format!("'{name}' is required"))));
        }
        Ok(())
    }

    fn require_document(&mut self, value: &Value, name: &str) -> Result<()> {
        if value.is_null() {
            return Err(self.fail(CtrlError::Precondition(format!("'{name}' is required"))));
        }
        Ok(())
    }

    fn on_service(&mut self, command: Command, service: &str) -> Result<CommandResponse> {
        self.require(service, "service")?;
        self.send(command, &[service], None)
    }

    fn on_service_with(
        &mut self,
        command: Command,
        service: &str,
        arguments: Value,
    ) -> Result<CommandResponse> {
        self.require(service, "service")?;
        self.send(command, &[service], Some(arguments))
    }

    // --- generic & daemon control ---

    pub fn list_commands(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ListCommands, service)
    }

    /// Fan-out is allowed here: with several services, entries are not
    /// checked beyond entry 0 being an object.
    pub fn version_get(&mut self, services: &[&str]) -> Result<CommandResponse> {
        for service in services {
            self.require(service, "service")?;
        }
        self.send(Command::VersionGet, services, None)
    }

    pub fn status_get(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::StatusGet, service)
    }

    pub fn shutdown(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::Shutdown, service)
    }

    pub fn build_report(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::BuildReport, service)
    }

    // --- configuration ---

    pub fn config_get(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ConfigGet, service)
    }

    /// Replace the running configuration. `config` is nested under the
    /// capitalized service name, e.g. `{"Dhcp4": config}`.
    pub fn config_set(&mut self, service: &str, config: &Value) -> Result<CommandResponse> {
        self.wrapped_config(Command::ConfigSet, service, config)
    }

    pub fn config_test(&mut self, service: &str, config: &Value) -> Result<CommandResponse> {
        self.wrapped_config(Command::ConfigTest, service, config)
    }

    fn wrapped_config(
        &mut self,
        command: Command,
        service: &str,
        config: &Value,
    ) -> Result<CommandResponse> {
        self.require(service, "service")?;
        self.require_document(config, "config")?;
        let mut wrapper = serde_json::Map::new();
        wrapper.insert(service_key(service), config.clone());
        self.send(command, &[service], Some(Value::Object(wrapper)))
    }

    pub fn config_reload(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ConfigReload, service)
    }

    pub fn config_write(&mut self, service: &str, filename: &str) -> Result<CommandResponse> {
        self.require(filename, "filename")?;
        self.on_service_with(Command::ConfigWrite, service, json!({ "filename": filename }))
    }

    pub fn config_backend_pull(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ConfigBackendPull, service)
    }

    pub fn config_hash_get(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ConfigHashGet, service)
    }

    pub fn server_tag_get(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ServerTagGet, service)
    }

    // --- subnets ---

    pub fn subnet4_list(&mut self) -> Result<CommandResponse> {
        self.send(Command::Subnet4List, &[DHCP4], None)
    }

    pub fn subnet4_get(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Subnet4Get, &[DHCP4], Some(json!({ "id": subnet_id })))
    }

    pub fn subnet4_add(&mut self, subnet: &Value) -> Result<CommandResponse> {
        self.require_document(subnet, "subnet")?;
        self.send(Command::Subnet4Add, &[DHCP4], Some(subnet.clone()))
    }

    pub fn subnet4_del(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Subnet4Del, &[DHCP4], Some(json!({ "id": subnet_id })))
    }

    pub fn subnet4_update(&mut self, subnet: &Value) -> Result<CommandResponse> {
        self.require_document(subnet, "subnet")?;
        self.send(Command::Subnet4Update, &[DHCP4], Some(subnet.clone()))
    }

    pub fn subnet6_list(&mut self) -> Result<CommandResponse> {
        self.send(Command::Subnet6List, &[DHCP6], None)
    }

    pub fn subnet6_get(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Subnet6Get, &[DHCP6], Some(json!({ "id": subnet_id })))
    }

    pub fn subnet6_add(&mut self, subnet: &Value) -> Result<CommandResponse> {
        self.require_document(subnet, "subnet")?;
        self.send(Command::Subnet6Add, &[DHCP6], Some(subnet.clone()))
    }

    pub fn subnet6_del(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Subnet6Del, &[DHCP6], Some(json!({ "id": subnet_id })))
    }

    pub fn subnet6_update(&mut self, subnet: &Value) -> Result<CommandResponse> {
        self.require_document(subnet, "subnet")?;
        self.send(Command::Subnet6Update, &[DHCP6], Some(subnet.clone()))
    }

    // --- DHCPv4 leases ---

    pub fn lease4_add(&mut self, lease: &Value) -> Result<CommandResponse> {
        self.require_document(lease, "lease")?;
        self.send(Command::Lease4Add, &[DHCP4], Some(lease.clone()))
    }

    pub fn lease4_del(&mut self, ip_address: &str) -> Result<CommandResponse> {
        self.require(ip_address, "ip-address")?;
        self.send(Command::Lease4Del, &[DHCP4], Some(json!({ "ip-address": ip_address })))
    }

    pub fn lease4_get_by_ip(&mut self, ip_address: &str) -> Result<CommandResponse> {
        self.require(ip_address, "ip-address")?;
        self.send(Command::Lease4Get, &[DHCP4], Some(json!({ "ip-address": ip_address })))
    }

    pub fn lease4_get_by_hw_address(&mut self, hw_address: &str) -> Result<CommandResponse> {
        self.require(hw_address, "hw-address")?;
        self.send(
            Command::Lease4GetByHwAddress,
            &[DHCP4],
            Some(json!({ "hw-address": hw_address })),
        )
    }

    pub fn lease4_get_by_client_id(&mut self, client_id: &str) -> Result<CommandResponse> {
        self.require(client_id, "client-id")?;
        self.send(
            Command::Lease4GetByClientId,
            &[DHCP4],
            Some(json!({ "client-id": client_id })),
        )
    }

    pub fn lease4_get_all(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Lease4GetAll, &[DHCP4], Some(json!({ "subnets": [subnet_id] })))
    }

    pub fn lease4_wipe(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Lease4Wipe, &[DHCP4], Some(json!({ "subnet-id": subnet_id })))
    }

    // --- DHCPv6 leases ---

    pub fn lease6_add(&mut self, lease: &Value) -> Result<CommandResponse> {
        self.require_document(lease, "lease")?;
        self.send(Command::Lease6Add, &[DHCP6], Some(lease.clone()))
    }

    pub fn lease6_del(&mut self, ip_address: &str) -> Result<CommandResponse> {
        self.require(ip_address, "ip-address")?;
        self.send(Command::Lease6Del, &[DHCP6], Some(json!({ "ip-address": ip_address })))
    }

    pub fn lease6_get_by_ip(&mut self, ip_address: &str) -> Result<CommandResponse> {
        self.require(ip_address, "ip-address")?;
        self.send(Command::Lease6Get, &[DHCP6], Some(json!({ "ip-address": ip_address })))
    }

    pub fn lease6_get_by_duid(&mut self, duid: &str, iaid: u32) -> Result<CommandResponse> {
        self.require(duid, "duid")?;
        self.send(
            Command::Lease6GetByDuid,
            &[DHCP6],
            Some(json!({ "duid": duid, "iaid": iaid })),
        )
    }

    pub fn lease6_get_all(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Lease6GetAll, &[DHCP6], Some(json!({ "subnets": [subnet_id] })))
    }

    pub fn lease6_wipe(&mut self, subnet_id: u32) -> Result<CommandResponse> {
        self.send(Command::Lease6Wipe, &[DHCP6], Some(json!({ "subnet-id": subnet_id })))
    }

    // --- host reservations ---

    pub fn reservation_add(&mut self, service: &str, host: &Value) -> Result<CommandResponse> {
        self.require_document(host, "reservation")?;
        self.on_service_with(
            Command::ReservationAdd,
            service,
            json!({ "reservation": host.clone() }),
        )
    }

    pub fn reservation_del_by_ip(
        &mut self,
        service: &str,
        subnet_id: u32,
        ip_address: &str,
    ) -> Result<CommandResponse> {
        self.require(ip_address, "ip-address")?;
        self.on_service_with(
            Command::ReservationDel,
            service,
            json!({
                "subnet-id": subnet_id,
                "identifier-type": "ip-address",
                "identifier": ip_address,
            }),
        )
    }

    pub fn reservation_get_by_ip(
        &mut self,
        service: &str,
        ip_address: &str,
    ) -> Result<CommandResponse> {
        self.require(ip_address, "ip-address")?;
        self.on_service_with(
            Command::ReservationGetByAddress,
            service,
            json!({ "ip-address": ip_address }),
        )
    }

    pub fn reservation_get_all(&mut self, service: &str, subnet_id: u32) -> Result<CommandResponse> {
        self.on_service_with(
            Command::ReservationGetAll,
            service,
            json!({ "subnet-id": subnet_id }),
        )
    }

    // --- statistics ---

    pub fn statistic_get(&mut self, service: &str, name: &str) -> Result<CommandResponse> {
        self.require(name, "name")?;
        self.on_service_with(Command::StatisticGet, service, json!({ "name": name }))
    }

    pub fn statistic_get_all(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::StatisticGetAll, service)
    }

    pub fn statistic_reset(&mut self, service: &str, name: &str) -> Result<CommandResponse> {
        self.require(name, "name")?;
        self.on_service_with(Command::StatisticReset, service, json!({ "name": name }))
    }

    pub fn statistic_reset_all(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::StatisticResetAll, service)
    }

    pub fn statistic_remove(&mut self, service: &str, name: &str) -> Result<CommandResponse> {
        self.require(name, "name")?;
        self.on_service_with(Command::StatisticRemove, service, json!({ "name": name }))
    }

    pub fn statistic_remove_all(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::StatisticRemoveAll, service)
    }

    // --- client classes ---

    pub fn class_add(&mut self, service: &str, class: &Value) -> Result<CommandResponse> {
        self.require_document(class, "class")?;
        self.on_service_with(Command::ClassAdd, service, class.clone())
    }

    pub fn class_del(&mut self, service: &str, name: &str) -> Result<CommandResponse> {
        self.require(name, "name")?;
        self.on_service_with(Command::ClassDel, service, json!({ "name": name }))
    }

    pub fn class_list(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::ClassList, service)
    }

    // --- host cache ---

    pub fn cache_clear(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::CacheClear, service)
    }

    pub fn cache_size(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::CacheSize, service)
    }

    pub fn cache_get(&mut self, service: &str) -> Result<CommandResponse> {
        self.on_service(Command::CacheGet, service)
    }
}
