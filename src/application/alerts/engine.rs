//! Alert rule registry

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::FeedError;

/// An alert evaluated on every scheduler tick.
///
/// `Ok(None)` (or an empty string) means no condition was met.
#[async_trait]
pub trait AlertRule: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(&self) -> Result<Option<String>, FeedError>;
}

/// Registered alert rules in registration order
#[derive(Default, Clone)]
pub struct AlertEngine {
    rules: Vec<Arc<dyn AlertRule>>,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule<R: AlertRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn rules(&self) -> &[Arc<dyn AlertRule>] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
