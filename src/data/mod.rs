//! External data: remote CSV fetching and the synthetic demo dataset.

pub mod demo;
pub mod remote;

pub use demo::{DemoConfig, generate_demo_rows, write_demo_dataset};
pub use remote::RemoteClient;
