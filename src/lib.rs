// Module naming follows project convention (IPC = inter-context messaging)
#[allow(non_snake_case)]
pub mod IPC;
#[allow(non_snake_case)]
pub mod Structs;
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
mod Debug;

pub mod config;
pub mod error;
pub mod ffi;
pub mod logging;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use Core::SharedMemory::SharedMemory;
pub use Core::{SegmentAllocator, SegmentHandle};
pub use IPC::{
    BusBuilder, Handler, MessageBus, MessageQueue, Procedure, RpcRouter, StreamCollector,
    StreamWriter, SubscriptionId, DEFAULT_CHUNK_SIZE,
};
pub use Structs::{Message, MessageKind};
