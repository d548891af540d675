//! Real-time channel transports.

pub mod ws;

pub use ws::WsChannel;
