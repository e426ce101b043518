//! Background services: oracle registration and event-driven response dispatch.

pub mod dispatcher;
pub mod registration;
