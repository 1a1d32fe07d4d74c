//! Conversation session management.
//!
//! A `Session` owns the message history of one conversation, forwards
//! each turn to its provider with the fixed system instruction, and
//! records usage. `submit` takes `&mut self`, so one session can never
//! have two requests in flight.

mod chat;
mod manager;

#[cfg(test)]
mod tests;

pub use manager::Session;
