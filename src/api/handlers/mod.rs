pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod signals;
pub mod stats;
pub mod webhook;
