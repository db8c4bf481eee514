//! Media record persistence: the port the application layer talks to and
//! the adapters behind it.

pub mod memory;
pub mod ports;
