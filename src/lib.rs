//! Hitsync: local mirror for a crowdsourcing marketplace.
//!
//! This crate keeps a queryable local copy of a requester's HITs,
//! assignments, and worker answers, synchronized from remote marketplace
//! snapshots, and drives the requester-side lifecycle operations (dispose,
//! expire, extend, review, approve, reject, bonus) against that mirror.
//!
//! # Architecture
//!
//! Hitsync follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, marketplace)
//!
//! # Modules
//!
//! - [`config`]: Marketplace endpoint and credential settings
//! - [`mirror`]: The mirror domain, ports, adapters, and services

pub mod config;
pub mod mirror;
