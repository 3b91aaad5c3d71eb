//! Gateway layer - outbound HTTP and PostgreSQL effects
//!
//! The only part of the program that touches the network. Everything in and
//! out goes through [`crate::messages::GatewayCommand`] and
//! [`crate::messages::GatewayEvent`].

pub mod actor;
pub mod http;
pub mod sql;

pub use actor::GatewayActor;
