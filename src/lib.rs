//! Helpdesk Relay - forwards ServiceDesk Plus ticket activity to Telegram chats.
//!
//! The relay polls the helpdesk on a fixed interval, compares every ticket
//! with the last snapshot it saw, and broadcasts a message to each subscribed
//! chat when a ticket appears or one of its display fields changes. Chats
//! subscribe and unsubscribe through bot commands.
//!
//! All state is in memory and is lost on restart.

pub mod commands;
pub mod config;
pub mod diff;
pub mod notify;
pub mod sdp;
pub mod server;
pub mod store;
pub mod subscribers;
pub mod telegram;
pub mod types;
pub mod worker;

#[cfg(test)]
mod test_utils;
