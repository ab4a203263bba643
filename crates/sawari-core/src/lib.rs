//! Core engine for the sawari vehicle-catalog crawl pipeline.
//!
//! The crate is organized around one session flow: a locator file becomes
//! a sharded job list ([`partition`]), an [`extract::Extractor`] runs each
//! job under a timeout with retry rounds ([`dispatch`]), records land in
//! deduplicating stores ([`store`]), and the written datasets pass through
//! a consistency gate ([`verify`]). [`pipeline`] wires the whole flow;
//! [`matcher`] reconciles variant names across datasets after the fact.

pub mod config;
pub mod dispatch;
pub mod extract;
pub mod joblist;
pub mod logging;
pub mod matcher;
pub mod partition;
pub mod pipeline;
pub mod record;
pub mod session;
pub mod store;
pub mod verify;
