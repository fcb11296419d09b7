//! Local mirror of a crowdsourcing marketplace's HITs, assignments, and
//! answers.
//!
//! The module follows a hexagonal layout: [`domain`] holds the pure model,
//! [`ports`] the marketplace and store contracts, [`adapters`] their
//! in-memory and `PostgreSQL` implementations, and [`services`] the sync and
//! lifecycle orchestration over the ports.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
