//! C-ABI wrapper around `kea-ctrl-core`.
//!
//! # Overview
//! Exposes the transaction client and the configuration builder through
//! `extern "C"` functions, so an orchestration layer written in any language
//! with a C FFI can drive a Kea control agent.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Failures are signalled by a null return. The reason is available from
//!   `kea_ctrl_get_last_error` and `kea_ctrl_last_error_kind` until the next
//!   call on the same context.
//! - Payloads travel as JSON strings in both directions. Every string this
//!   library returns is owned by the caller and released with
//!   `kea_free_string`.
//! - String arguments are borrowed for the duration of the call only.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use kea_ctrl_core::{
    build_dhcp4_config, build_dhcp6_config, BuildError, CommandResponse, ConfigData, CtrlError,
    Result, TransactionContext,
};
use serde_json::Value;
use tracing::warn;

use types::*;

const INVALID_CONTEXT: &CStr = c"Invalid context provided.";

/// Borrow a C string argument. Null and non-UTF-8 input read as empty, which
/// the core rejects as a missing parameter.
fn str_arg<'a>(s: *const c_char) -> &'a str {
    if s.is_null() {
        return "";
    }
    unsafe { CStr::from_ptr(s) }.to_str().unwrap_or("")
}

/// Parse a JSON document argument. Null reads as JSON `null`.
fn json_arg(s: *const c_char, name: &str) -> std::result::Result<Value, CtrlError> {
    if s.is_null() {
        return Ok(Value::Null);
    }
    let text = unsafe { CStr::from_ptr(s) }
        .to_str()
        .map_err(|_| CtrlError::Precondition(format!("'{name}' is not valid UTF-8")))?;
    serde_json::from_str(text)
        .map_err(|e| CtrlError::Precondition(format!("'{name}' is not valid JSON: {e}")))
}

/// Borrow a C array of `len` service names. Every name must be non-empty.
fn services_arg<'a>(
    services: *const *const c_char,
    len: usize,
) -> std::result::Result<Vec<&'a str>, CtrlError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if services.is_null() {
        return Err(CtrlError::Precondition("'services' is null".to_string()));
    }
    let names: Vec<&str> = (0..len).map(|i| str_arg(unsafe { *services.add(i) })).collect();
    if names.iter().any(|name| name.is_empty()) {
        return Err(CtrlError::Precondition("'service' is required".to_string()));
    }
    Ok(names)
}

/// Run `call` against the context behind `ctx` and convert the outcome.
fn with_context<F>(ctx: *mut KeaCtrlContext, call: F) -> *mut c_char
where
    F: FnOnce(&mut TransactionContext) -> Result<CommandResponse>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if ctx.is_null() {
            return ptr::null_mut();
        }
        let ctx = unsafe { &mut *ctx };
        let result = call(&mut ctx.inner);
        ctx.finish(result)
    }))
    .unwrap_or(ptr::null_mut())
}

/// Like `with_context`, for calls that take one JSON document argument.
fn with_document<F>(ctx: *mut KeaCtrlContext, json: *const c_char, name: &str, call: F) -> *mut c_char
where
    F: FnOnce(&mut TransactionContext, &Value) -> Result<CommandResponse>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if ctx.is_null() {
            return ptr::null_mut();
        }
        let ctx = unsafe { &mut *ctx };
        match json_arg(json, name) {
            Ok(document) => {
                let result = call(&mut ctx.inner, &document);
                ctx.finish(result)
            }
            Err(err) => ctx.reject(err),
        }
    }))
    .unwrap_or(ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Context lifecycle
// ---------------------------------------------------------------------------

/// Create a context for `endpoint`, or for `http://127.0.0.1:8000` when
/// `endpoint` is null.
///
/// Returns null if the endpoint is not a valid http(s) URL or if an internal
/// panic occurs. The caller must free the returned pointer with
/// `kea_ctrl_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_create(endpoint: *const c_char) -> *mut KeaCtrlContext {
    catch_unwind(|| {
        let endpoint = if endpoint.is_null() {
            None
        } else {
            match unsafe { CStr::from_ptr(endpoint) }.to_str() {
                Ok(s) => Some(s),
                Err(_) => return ptr::null_mut(),
            }
        };
        match TransactionContext::create(endpoint) {
            Ok(inner) => Box::into_raw(Box::new(KeaCtrlContext::new(inner))),
            Err(err) => {
                warn!(error = %err, "context creation failed");
                ptr::null_mut()
            }
        }
    })
    .unwrap_or(ptr::null_mut())
}

/// Destroy a context created by `kea_ctrl_create`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_destroy(ctx: *mut KeaCtrlContext) {
    if !ctx.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(ctx) });
        }));
    }
}

/// Message describing the most recent failure on `ctx`, or "No error".
///
/// The pointer is owned by the context and stays valid until the next call
/// on it. Must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_get_last_error(ctx: *const KeaCtrlContext) -> *const c_char {
    if ctx.is_null() {
        return INVALID_CONTEXT.as_ptr();
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { &*ctx }.last_error_ptr()))
        .unwrap_or(INVALID_CONTEXT.as_ptr())
}

/// Classification of the most recent failure on `ctx`. `Init` for null.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_last_error_kind(ctx: *const KeaCtrlContext) -> KeaErrorKind {
    if ctx.is_null() {
        return KeaErrorKind::Init;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { &*ctx }.last_kind())).unwrap_or(KeaErrorKind::Init)
}

// ---------------------------------------------------------------------------
// Generic transaction
// ---------------------------------------------------------------------------

/// Send `command` to `services_len` services with optional JSON `arguments`.
///
/// `services` may be null when `services_len` is 0. `arguments_json` may be
/// null to omit arguments. Returns the full response array as JSON, or null
/// on failure.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_execute(
    ctx: *mut KeaCtrlContext,
    command: *const c_char,
    services: *const *const c_char,
    services_len: usize,
    arguments_json: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if ctx.is_null() {
            return ptr::null_mut();
        }
        let ctx = unsafe { &mut *ctx };

        let command = str_arg(command);
        if command.is_empty() {
            return ctx.reject(CtrlError::Precondition("'command' is required".to_string()));
        }
        let names = match services_arg(services, services_len) {
            Ok(names) => names,
            Err(err) => return ctx.reject(err),
        };

        let arguments = match json_arg(arguments_json, "arguments") {
            Ok(Value::Null) => None,
            Ok(arguments) => Some(arguments),
            Err(err) => return ctx.reject(err),
        };
        let result = ctx.inner.execute_transaction(command, &names, arguments);
        ctx.finish(result)
    }))
    .unwrap_or(ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Generic & configuration commands
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_list_commands(ctx: *mut KeaCtrlContext, service: *const c_char) -> *mut c_char {
    with_context(ctx, |inner| inner.list_commands(str_arg(service)))
}

/// `version-get` fanned out to `services_len` services. Per-service failures
/// are left in the returned array when more than one service is named.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_version_get(
    ctx: *mut KeaCtrlContext,
    services: *const *const c_char,
    services_len: usize,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if ctx.is_null() {
            return ptr::null_mut();
        }
        let ctx = unsafe { &mut *ctx };
        match services_arg(services, services_len) {
            Ok(names) => {
                let result = ctx.inner.version_get(&names);
                ctx.finish(result)
            }
            Err(err) => ctx.reject(err),
        }
    }))
    .unwrap_or(ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_status_get(ctx: *mut KeaCtrlContext, service: *const c_char) -> *mut c_char {
    with_context(ctx, |inner| inner.status_get(str_arg(service)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_config_get(ctx: *mut KeaCtrlContext, service: *const c_char) -> *mut c_char {
    with_context(ctx, |inner| inner.config_get(str_arg(service)))
}

/// Replace the running configuration of `service` with `config_json`, which
/// is wrapped under the capitalized service name before sending.
#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_config_set(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    with_document(ctx, config_json, "config", |inner, config| {
        inner.config_set(str_arg(service), config)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_config_test(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    with_document(ctx, config_json, "config", |inner, config| {
        inner.config_test(str_arg(service), config)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_config_write(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    filename: *const c_char,
) -> *mut c_char {
    with_context(ctx, |inner| inner.config_write(str_arg(service), str_arg(filename)))
}

// ---------------------------------------------------------------------------
// Subnets
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_subnet4_list(ctx: *mut KeaCtrlContext) -> *mut c_char {
    with_context(ctx, |inner| inner.subnet4_list())
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_subnet4_get(ctx: *mut KeaCtrlContext, subnet_id: u32) -> *mut c_char {
    with_context(ctx, |inner| inner.subnet4_get(subnet_id))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_subnet4_add(ctx: *mut KeaCtrlContext, subnet_json: *const c_char) -> *mut c_char {
    with_document(ctx, subnet_json, "subnet", |inner, subnet| inner.subnet4_add(subnet))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_subnet4_del(ctx: *mut KeaCtrlContext, subnet_id: u32) -> *mut c_char {
    with_context(ctx, |inner| inner.subnet4_del(subnet_id))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_subnet6_list(ctx: *mut KeaCtrlContext) -> *mut c_char {
    with_context(ctx, |inner| inner.subnet6_list())
}

// ---------------------------------------------------------------------------
// Leases
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease4_add(ctx: *mut KeaCtrlContext, lease_json: *const c_char) -> *mut c_char {
    with_document(ctx, lease_json, "lease", |inner, lease| inner.lease4_add(lease))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease4_del(ctx: *mut KeaCtrlContext, ip_address: *const c_char) -> *mut c_char {
    with_context(ctx, |inner| inner.lease4_del(str_arg(ip_address)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease4_get_by_ip(
    ctx: *mut KeaCtrlContext,
    ip_address: *const c_char,
) -> *mut c_char {
    with_context(ctx, |inner| inner.lease4_get_by_ip(str_arg(ip_address)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease4_get_all(ctx: *mut KeaCtrlContext, subnet_id: u32) -> *mut c_char {
    with_context(ctx, |inner| inner.lease4_get_all(subnet_id))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease4_wipe(ctx: *mut KeaCtrlContext, subnet_id: u32) -> *mut c_char {
    with_context(ctx, |inner| inner.lease4_wipe(subnet_id))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease6_add(ctx: *mut KeaCtrlContext, lease_json: *const c_char) -> *mut c_char {
    with_document(ctx, lease_json, "lease", |inner, lease| inner.lease6_add(lease))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease6_del(ctx: *mut KeaCtrlContext, ip_address: *const c_char) -> *mut c_char {
    with_context(ctx, |inner| inner.lease6_del(str_arg(ip_address)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease6_get_by_ip(
    ctx: *mut KeaCtrlContext,
    ip_address: *const c_char,
) -> *mut c_char {
    with_context(ctx, |inner| inner.lease6_get_by_ip(str_arg(ip_address)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_lease6_get_by_duid(
    ctx: *mut KeaCtrlContext,
    duid: *const c_char,
    iaid: u32,
) -> *mut c_char {
    with_context(ctx, |inner| inner.lease6_get_by_duid(str_arg(duid), iaid))
}

// ---------------------------------------------------------------------------
// Reservations, statistics, classes
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_reservation_add(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    reservation_json: *const c_char,
) -> *mut c_char {
    with_document(ctx, reservation_json, "reservation", |inner, host| {
        inner.reservation_add(str_arg(service), host)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_reservation_del_by_ip(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    subnet_id: u32,
    ip_address: *const c_char,
) -> *mut c_char {
    with_context(ctx, |inner| {
        inner.reservation_del_by_ip(str_arg(service), subnet_id, str_arg(ip_address))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_reservation_get_all(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    subnet_id: u32,
) -> *mut c_char {
    with_context(ctx, |inner| inner.reservation_get_all(str_arg(service), subnet_id))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_statistic_get(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    with_context(ctx, |inner| inner.statistic_get(str_arg(service), str_arg(name)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_statistic_get_all(
    ctx: *mut KeaCtrlContext,
    service: *const c_char,
) -> *mut c_char {
    with_context(ctx, |inner| inner.statistic_get_all(str_arg(service)))
}

#[unsafe(no_mangle)]
pub extern "C" fn kea_ctrl_class_list(ctx: *mut KeaCtrlContext, service: *const c_char) -> *mut c_char {
    with_context(ctx, |inner| inner.class_list(str_arg(service)))
}

// ---------------------------------------------------------------------------
// Configuration builder
// ---------------------------------------------------------------------------

fn build_document<F>(config_json: *const c_char, build: F) -> *mut c_char
where
    F: FnOnce(&ConfigData) -> std::result::Result<Value, BuildError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if config_json.is_null() {
            return ptr::null_mut();
        }
        let config: ConfigData = match serde_json::from_str(str_arg(config_json)) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "configuration input is not valid JSON");
                return ptr::null_mut();
            }
        };
        match build(&config) {
            Ok(document) => c_string(&document.to_string()).into_raw(),
            Err(err) => {
                warn!(error = %err, "configuration document rejected");
                ptr::null_mut()
            }
        }
    }))
    .unwrap_or(ptr::null_mut())
}

/// Build the body of a `Dhcp4` configuration from a JSON-encoded
/// `ConfigData`. Returns null if the input is malformed or incomplete.
#[unsafe(no_mangle)]
pub extern "C" fn kea_build_dhcp4_config(config_json: *const c_char) -> *mut c_char {
    build_document(config_json, build_dhcp4_config)
}

/// Build the body of a `Dhcp6` configuration from a JSON-encoded
/// `ConfigData`. Returns null if the input is malformed or incomplete.
#[unsafe(no_mangle)]
pub extern "C" fn kea_build_dhcp6_config(config_json: *const c_char) -> *mut c_char {
    build_document(config_json, build_dhcp6_config)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn kea_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
