//! Core domain types
//!
//! This module contains the domain structures shared between the relay
//! client and the binding layer: messages as delivered by the relay, the
//! job state vocabulary published on the status topic, and topic name
//! derivation.

pub mod job;
pub mod message;
pub mod topic;
