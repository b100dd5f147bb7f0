//! The worker process scaffold: owns the database file exclusively, serves
//! `ProxyDriver` commands over a Unix socket, and drives the vectorization
//! loop on a schedule (spec §4.1, §4.7, §6).

mod listener;
mod scheduler;
mod worker;

pub use listener::Listener;
pub use scheduler::Scheduler;
pub use worker::DbWorker;
