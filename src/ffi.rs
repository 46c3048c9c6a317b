use crate::Core::SharedMemory::SharedMemory;
use crate::IPC::{MessageBus, SubscriptionId};
use crate::Structs::{Message, MessageKind};
use crate::error::BridgeError;
use libc::{c_char, c_void};
use std::ffi::CStr;
use std::ptr;
use std::sync::Arc;
use tracing::error;

// Error codes
pub const DMXP_SUCCESS: i32 = 0;
pub const DMXP_ERROR_NULL_POINTER: i32 = -1;
pub const DMXP_ERROR_INVALID_ARG: i32 = -2;
pub const DMXP_ERROR_NOT_FOUND: i32 = -5;
pub const DMXP_ERROR_OUT_OF_BOUNDS: i32 = -7;

// Message kind tags in `DmxpMessage::kind`
pub const DMXP_KIND_REQUEST: u32 = 0;
pub const DMXP_KIND_RESPONSE: u32 = 1;
pub const DMXP_KIND_EVENT: u32 = 2;
pub const DMXP_KIND_STREAM: u32 = 3;

/// Borrowed view of a message handed to C callbacks.
///
/// All pointers are valid only for the duration of the callback. The
/// channel bytes are not NUL-terminated.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct DmxpMessage {
    pub id: u64,
    pub timestamp: i64,
    pub kind: u32,
    pub reserved: u32,
    pub channel: *const u8,
    pub channel_len: usize,
    pub payload: *const u8,
    pub payload_len: usize,
}

pub type DmxpCallback = extern "C" fn(message: *const DmxpMessage, user_data: *mut c_void);

/// Handle to a bus instance (opaque pointer)
pub struct BusHandle {
    inner: Arc<MessageBus>,
}

/// Handle to a shared memory segment (opaque pointer)
pub struct ShmHandle {
    inner: SharedMemory,
}

// The caller promises `user_data` may be used from whichever thread dispatches.
#[derive(Copy, Clone)]
struct UserData(*mut c_void);
unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

fn kind_tag(kind: MessageKind) -> u32 {
    match kind {
        MessageKind::Request => DMXP_KIND_REQUEST,
        MessageKind::Response => DMXP_KIND_RESPONSE,
        MessageKind::Event => DMXP_KIND_EVENT,
        MessageKind::Stream => DMXP_KIND_STREAM,
    }
}

fn view(message: &Message) -> DmxpMessage {
    DmxpMessage {
        id: message.id(),
        timestamp: message.timestamp(),
        kind: kind_tag(message.kind()),
        reserved: 0,
        channel: message.channel().as_ptr(),
        channel_len: message.channel().len(),
        payload: message.payload().as_ptr(),
        payload_len: message.payload().len(),
    }
}

fn invoke(callback: DmxpCallback, user_data: UserData, message: &Message) {
    let raw = view(message);
    callback(&raw, user_data.0);
}

/// # Safety
/// `data` must point to `len` readable bytes unless `len` is 0.
unsafe fn bytes<'a>(data: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if data.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(data, len))
    }
}

/// # Safety
/// `arg` must be NULL or a valid NUL-terminated string.
unsafe fn c_str_arg<'a>(arg: *const c_char) -> Result<&'a str, i32> {
    if arg.is_null() {
        return Err(DMXP_ERROR_NULL_POINTER);
    }
    CStr::from_ptr(arg)
        .to_str()
        .map_err(|_| DMXP_ERROR_INVALID_ARG)
}

fn status(err: &BridgeError) -> i32 {
    match err {
        BridgeError::OutOfBounds { .. } => DMXP_ERROR_OUT_OF_BOUNDS,
        BridgeError::ProcedureNotFound(_) | BridgeError::SegmentNotFound(_) => DMXP_ERROR_NOT_FOUND,
        _ => DMXP_ERROR_INVALID_ARG,
    }
}

// -----------------------------------------------------------------------------
// Bus API
// -----------------------------------------------------------------------------

/// Create a new bus with default settings.
#[no_mangle]
pub extern "C" fn dmxp_bus_new() -> *mut BusHandle {
    let handle = Box::new(BusHandle {
        inner: Arc::new(MessageBus::new()),
    });
    Box::into_raw(handle)
}

/// Free a bus handle. Pending request callbacks are dropped uninvoked.
#[no_mangle]
pub extern "C" fn dmxp_bus_free(handle: *mut BusHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}

/// Subscribe a callback to a channel.
///
/// # Returns
/// * The subscription id (never 0), or 0 on failure.
#[no_mangle]
pub extern "C" fn dmxp_bus_on(
    handle: *mut BusHandle,
    channel: *const c_char,
    callback: Option<DmxpCallback>,
    user_data: *mut c_void,
) -> u64 {
    if handle.is_null() {
        return 0;
    }
    let Some(callback) = callback else {
        return 0;
    };
    let channel = match unsafe { c_str_arg(channel) } {
        Ok(channel) => channel,
        Err(_) => {
            error!("FFI Error: invalid channel name passed to dmxp_bus_on");
            return 0;
        }
    };

    let bus = unsafe { &(*handle).inner };
    let user_data = UserData(user_data);
    bus.on(channel, move |message: &Message| invoke(callback, user_data, message))
        .as_u64()
}

/// Remove a subscription.
///
/// # Returns
/// * 0 on success, DMXP_ERROR_NOT_FOUND if the subscription is unknown.
#[no_mangle]
pub extern "C" fn dmxp_bus_off(
    handle: *mut BusHandle,
    channel: *const c_char,
    subscription: u64,
) -> i32 {
    if handle.is_null() {
        return DMXP_ERROR_NULL_POINTER;
    }
    let channel = match unsafe { c_str_arg(channel) } {
        Ok(channel) => channel,
        Err(code) => return code,
    };

    let bus = unsafe { &(*handle).inner };
    if bus.off(channel, SubscriptionId::from_raw(subscription)) {
        DMXP_SUCCESS
    } else {
        DMXP_ERROR_NOT_FOUND
    }
}

/// Send an event.
///
/// # Arguments
/// * `out_id` - Optional; receives the allocated message id.
#[no_mangle]
pub extern "C" fn dmxp_bus_send(
    handle: *mut BusHandle,
    channel: *const c_char,
    data: *const u8,
    len: usize,
    out_id: *mut u64,
) -> i32 {
    if handle.is_null() {
        return DMXP_ERROR_NULL_POINTER;
    }
    let channel = match unsafe { c_str_arg(channel) } {
        Ok(channel) => channel,
        Err(code) => return code,
    };
    let Some(payload) = (unsafe { bytes(data, len) }) else {
        return DMXP_ERROR_NULL_POINTER;
    };

    let bus = unsafe { &(*handle).inner };
    let id = bus.send(channel, payload);
    if !out_id.is_null() {
        unsafe { *out_id = id };
    }
    DMXP_SUCCESS
}

/// Send a request; `callback` runs once when the matching response arrives.
///
/// # Arguments
/// * `out_id` - Optional; receives the correlation id.
#[no_mangle]
pub extern "C" fn dmxp_bus_request(
    handle: *mut BusHandle,
    channel: *const c_char,
    data: *const u8,
    len: usize,
    callback: Option<DmxpCallback>,
    user_data: *mut c_void,
    out_id: *mut u64,
) -> i32 {
    if handle.is_null() {
        return DMXP_ERROR_NULL_POINTER;
    }
    let Some(callback) = callback else {
        return DMXP_ERROR_NULL_POINTER;
    };
    let channel = match unsafe { c_str_arg(channel) } {
        Ok(channel) => channel,
        Err(code) => return code,
    };
    let Some(payload) = (unsafe { bytes(data, len) }) else {
        return DMXP_ERROR_NULL_POINTER;
    };

    let bus = unsafe { &(*handle).inner };
    let user_data = UserData(user_data);
    let id = bus.request(channel, payload, move |message: &Message| {
        invoke(callback, user_data, message)
    });
    if !out_id.is_null() {
        unsafe { *out_id = id };
    }
    DMXP_SUCCESS
}

/// Answer a pending request.
///
/// # Returns
/// * 0 on success, DMXP_ERROR_NOT_FOUND if no request is pending under `id`.
#[no_mangle]
pub extern "C" fn dmxp_bus_respond(
    handle: *mut BusHandle,
    id: u64,
    data: *const u8,
    len: usize,
) -> i32 {
    if handle.is_null() {
        return DMXP_ERROR_NULL_POINTER;
    }
    let Some(payload) = (unsafe { bytes(data, len) }) else {
        return DMXP_ERROR_NULL_POINTER;
    };

    let bus = unsafe { &(*handle).inner };
    if bus.respond(id, payload) {
        DMXP_SUCCESS
    } else {
        DMXP_ERROR_NOT_FOUND
    }
}

// -----------------------------------------------------------------------------
// Shared memory API
// -----------------------------------------------------------------------------

/// Create a zero-filled segment.
///
/// # Returns
/// * Pointer to `ShmHandle`, or NULL on failure.
#[no_mangle]
pub extern "C" fn dmxp_shm_create(name: *const c_char, capacity: usize) -> *mut ShmHandle {
    let name = match unsafe { c_str_arg(name) } {
        Ok(name) => name,
        Err(_) => {
            error!("FFI Error: invalid segment name passed to dmxp_shm_create");
            return ptr::null_mut();
        }
    };
    let handle = Box::new(ShmHandle {
        inner: SharedMemory::create(name, capacity),
    });
    Box::into_raw(handle)
}

/// Copy `len` bytes from `data` into the segment at `offset`.
#[no_mangle]
pub extern "C" fn dmxp_shm_write(
    handle: *mut ShmHandle,
    offset: usize,
    data: *const u8,
    len: usize,
) -> i32 {
    if handle.is_null() {
        return DMXP_ERROR_NULL_POINTER;
    }
    let Some(bytes) = (unsafe { bytes(data, len) }) else {
        return DMXP_ERROR_NULL_POINTER;
    };

    let shm = unsafe { &mut (*handle).inner };
    match shm.write(offset, bytes) {
        Ok(()) => DMXP_SUCCESS,
        Err(e) => status(&e),
    }
}

/// Copy `len` bytes at `offset` out of the segment into `out_buf`.
#[no_mangle]
pub extern "C" fn dmxp_shm_read(
    handle: *mut ShmHandle,
    offset: usize,
    out_buf: *mut u8,
    len: usize,
) -> i32 {
    if handle.is_null() || (out_buf.is_null() && len > 0) {
        return DMXP_ERROR_NULL_POINTER;
    }

    let shm = unsafe { &(*handle).inner };
    if len == 0 {
        return match shm.read(offset, 0) {
            Ok(_) => DMXP_SUCCESS,
            Err(e) => status(&e),
        };
    }

    let out = unsafe { std::slice::from_raw_parts_mut(out_buf, len) };
    match shm.read_into(offset, out) {
        Ok(()) => DMXP_SUCCESS,
        Err(e) => status(&e),
    }
}

/// Capacity of the segment in bytes, or 0 for a NULL handle.
#[no_mangle]
pub extern "C" fn dmxp_shm_capacity(handle: *const ShmHandle) -> usize {
    if handle.is_null() {
        return 0;
    }
    unsafe { (*handle).inner.capacity() }
}

/// Free a segment handle.
#[no_mangle]
pub extern "C" fn dmxp_shm_free(handle: *mut ShmHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle);
        }
    }
}
