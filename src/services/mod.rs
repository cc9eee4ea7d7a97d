//! Business logic services.
//!
//! Services contain the access-control decision logic separated from HTTP
//! handlers. Each request-facing service owns its own database transaction
//! and appends its own audit trail.

/// Append-only access log writer
pub mod audit;
/// Key issuance and card provisioning
pub mod provision_service;
/// Card verification
pub mod verify_service;
