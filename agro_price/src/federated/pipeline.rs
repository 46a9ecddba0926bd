//! Stage tracking for one federated pipeline run

use crate::crop::Crop;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Stages of a run, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    DataGenerated,
    LocallyTrained,
    Averaged,
    Forecasted,
    Done,
}

impl PipelineStage {
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::DataGenerated),
            PipelineStage::DataGenerated => Some(PipelineStage::LocallyTrained),
            PipelineStage::LocallyTrained => Some(PipelineStage::Averaged),
            PipelineStage::Averaged => Some(PipelineStage::Forecasted),
            PipelineStage::Forecasted => Some(PipelineStage::Done),
            PipelineStage::Done => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Progress of a single run; nothing carries over between runs
#[derive(Debug, Clone)]
pub struct PipelineRun {
    crop: Crop,
    trail: Vec<PipelineStage>,
}

impl PipelineRun {
    pub fn start(crop: Crop) -> Self {
        info!(crop = crop.key(), "federated pipeline started");
        Self {
            crop,
            trail: vec![PipelineStage::Idle],
        }
    }

    pub fn current(&self) -> PipelineStage {
        self.trail.last().copied().unwrap_or(PipelineStage::Idle)
    }

    /// Move to `stage`, which must directly follow the current one
    pub fn advance(&mut self, stage: PipelineStage) -> Result<()> {
        let current = self.current();
        if current.next() != Some(stage) {
            return Err(ForecastError::Pipeline(format!(
                "Cannot move from {} to {}",
                current, stage
            )));
        }

        self.trail.push(stage);
        info!(crop = self.crop.key(), stage = %stage, "federated pipeline stage");
        Ok(())
    }

    pub fn trail(&self) -> &[PipelineStage] {
        &self.trail
    }

    pub fn into_trail(self) -> Vec<PipelineStage> {
        self.trail
    }
}
