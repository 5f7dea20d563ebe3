//! Core traits shared by models, contracts, and services

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValidationErrors;

/// Primary key type
pub type Id = Uuid;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}

/// Trait for entities with a creation timestamp
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

/// Trait for entities that belong to an order
pub trait OrderScoped {
    fn order_id(&self) -> Option<Id>;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Timestamped + Send + Sync {
    /// Human-readable type name for error messages and `_type` fields
    const TYPE_NAME: &'static str;
}

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Validation rules applied before a service computes anything
pub trait Contract<T>: Send + Sync {
    fn validate(&self, subject: &T) -> ValidationResult;
}
