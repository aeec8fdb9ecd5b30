//! Application state for the balance engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::pipeline::BalancePipeline;

/// Shared application state.
///
/// Holds the pipeline built from the loaded cluster configuration. Every
/// request runs against fresh stores, so one pipeline serves all handlers.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<BalancePipeline>,
}

impl AppState {
    /// Builds the pipeline from a loaded configuration.
    pub fn new(loader: ConfigLoader) -> EngineResult<Self> {
        let pipeline = BalancePipeline::new(loader.into_config())?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
        })
    }

    /// Returns the shared pipeline.
    pub fn pipeline(&self) -> &BalancePipeline {
        &self.pipeline
    }
}
