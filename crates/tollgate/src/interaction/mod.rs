//! Types and support traits for responding to application interaction events

pub mod command;
pub mod completion;
pub mod dispatch;
pub mod handler;
pub mod option;
pub mod payload;
pub mod registry;
pub mod response;

pub use payload::ProtocolError;
pub use registry::Registry;
