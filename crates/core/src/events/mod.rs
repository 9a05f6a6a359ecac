//! Integration events module.
//!
//! Provides the events published by the policy service after successful
//! mutations, the sink trait used to emit them, and the in-process mediator
//! that fans received events out to local projections.

mod integration_event;
mod mediator;
mod sink;

pub use integration_event::*;
pub use mediator::*;
pub use sink::*;
