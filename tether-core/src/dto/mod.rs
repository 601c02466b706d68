//! Data Transfer Objects for the relay HTTP API
//!
//! This module contains the wire shapes exchanged with the relay server:
//! login grants, message publication (single and bulk) and long-poll
//! requests/responses. DTOs are lightweight representations optimized for
//! network transfer.

pub mod auth;
pub mod poll;
pub mod publish;
