mod builder;
mod bus;
mod correlator;
mod debug;
mod queue;
mod rpc;
mod stream;

pub use builder::BusBuilder;
pub use bus::{Handler, MessageBus, SubscriptionId};
pub use queue::MessageQueue;
pub use rpc::{Procedure, RpcRouter};
pub use stream::{StreamCollector, StreamWriter, DEFAULT_CHUNK_SIZE};
