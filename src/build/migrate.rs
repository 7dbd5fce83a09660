//! Remote database migration interface
//!
//! After a successful "done" notification, builds with the database feature
//! apply pending remote migrations and then pending remote queries. The
//! actual work happens behind [`DatabaseMigrator`] so embedders can plug in
//! their platform client; the CLI wires [`NoopMigrator`] when nothing manages
//! remote data.

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// A failed migration or query step, with the step's own explanation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct MigrateError(pub String);

/// Applies pending remote database changes for a project
#[async_trait]
pub trait DatabaseMigrator: Send + Sync {
    /// Applies pending remote migrations
    async fn apply_migrations(&self) -> Result<(), MigrateError>;

    /// Applies pending remote queries
    async fn apply_queries(&self) -> Result<(), MigrateError>;
}

/// Migrator that applies nothing and always succeeds
pub struct NoopMigrator;

#[async_trait]
impl DatabaseMigrator for NoopMigrator {
    async fn apply_migrations(&self) -> Result<(), MigrateError> {
        debug!("No migrator configured, skipping remote migrations");
        Ok(())
    }

    async fn apply_queries(&self) -> Result<(), MigrateError> {
        debug!("No migrator configured, skipping remote queries");
        Ok(())
    }
}

/// Scriptable migrator that records the order of calls
pub struct MockMigrator {
    migrations_error: Option<MigrateError>,
    queries_error: Option<MigrateError>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockMigrator {
    pub fn new() -> Self {
        Self {
            migrations_error: None,
            queries_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes `apply_migrations` fail with the given message
    pub fn fail_migrations(mut self, message: impl Into<String>) -> Self {
        self.migrations_error = Some(MigrateError(message.into()));
        self
    }

    /// Makes `apply_queries` fail with the given message
    pub fn fail_queries(mut self, message: impl Into<String>) -> Self {
        self.queries_error = Some(MigrateError(message.into()));
        self
    }

    /// Returns the calls observed so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockMigrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseMigrator for MockMigrator {
    async fn apply_migrations(&self) -> Result<(), MigrateError> {
        self.calls.lock().unwrap().push("migrations");
        match &self.migrations_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn apply_queries(&self) -> Result<(), MigrateError> {
        self.calls.lock().unwrap().push("queries");
        match &self.queries_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
