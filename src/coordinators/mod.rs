// Coordinators layer - Workflow orchestration
//
// Coordinators compose provider operations into the session and phone-binding
// workflows and convert failures into caller-facing errors.

pub mod auth_coordinator;
pub mod phone_binding_coordinator;

pub use auth_coordinator::AuthCoordinator;
pub use phone_binding_coordinator::PhoneBindingCoordinator;
