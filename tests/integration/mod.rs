//! Integration test modules for sio

pub mod context;
pub mod device;
pub mod ring_buffer;
pub mod streams;
