//! Audit of redundant images and their cleanup.

mod engine;

pub use engine::{AuditEngine, AuditReport, CleanupReport};
