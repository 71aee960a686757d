//! Route modules for the agent service.
//!
//! - [`service`] — service info, health, status (all exempt from auth)
//! - [`agent_description`] — the ANP agent description and its linked
//!   info/product resources
//! - [`interfaces`] — OpenRPC JSON and YAML interface definition files
//! - [`jsonrpc`] — the unified JSON-RPC 2.0 endpoint

pub mod agent_description;
pub mod interfaces;
pub mod jsonrpc;
pub mod service;
