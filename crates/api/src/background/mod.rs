//! Background interval jobs, spawned from `main.rs` and cancelled via a
//! shared `CancellationToken` on shutdown.

pub mod dispatch_loop;
pub mod rollover;
