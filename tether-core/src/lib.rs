//! Tether Core
//!
//! Core types and abstractions for the Tether relay binding.
//!
//! This crate contains:
//! - Domain types: messages, job states, topic name derivation
//! - DTOs: wire shapes for the relay's HTTP API (login, publish, poll)

pub mod domain;
pub mod dto;
