//! Crime Fleet library surface.
//!
//! The runtime automates rate-limited game actions (crimes, vehicle theft,
//! skill training, travel) for many wallets across chains. The operator
//! workflow is the `crime_fleet` binary (`src/main.rs`); everything here is
//! also exposed for the API/dashboard layer to drive directly.

pub mod actions;
pub mod error;
pub mod executor;
pub mod runtime;
pub mod scheduler;
pub mod utils;
pub mod wallets;

pub mod config {
    pub mod chains;
}
