//! Session application services.
//!
//! This module contains the per-session actor and the services that create,
//! look up and remove sessions.

mod factory;
mod registry;
mod supervisor;

pub use factory::SessionFactory;
pub use registry::SessionRegistry;
pub use supervisor::{InteractionHandle, SessionSupervisor};
