//! Issue-tracker (Linear) integration: read-only issue views, a typed
//! query filter, and the GraphQL client.

pub mod client;
pub mod models;
pub mod query;

pub use client::LinearClient;
