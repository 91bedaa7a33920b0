//! Business logic services

mod controller_service;

pub use controller_service::{ControllerService, FieldMap};
