//! Database models shared across the contacts repository.

pub mod config;
pub mod contact;
pub mod user;
pub mod zmq;
