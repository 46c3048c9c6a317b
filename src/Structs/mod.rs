pub mod Message_Structs;
pub use Message_Structs::{now_millis, Message, MessageKind}; // re-export for stable path
