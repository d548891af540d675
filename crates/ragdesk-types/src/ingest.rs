//! Ingestion pipeline stages and tracker state.
//!
//! The indexing backend reports progress by naming the stage it reached.
//! Stage names map to fixed positions in [`Stage::CANONICAL`]; the position
//! is a property of the name, not of the order notifications arrive in.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// One step of the backend's ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Processing,
    Chunking,
    Embedding,
    Storing,
}

impl Stage {
    /// Pipeline order: validate/process, split, embed, persist.
    pub const CANONICAL: [Stage; 4] = [
        Stage::Processing,
        Stage::Chunking,
        Stage::Embedding,
        Stage::Storing,
    ];

    /// Fixed position of this stage in [`Stage::CANONICAL`].
    pub fn index(self) -> usize {
        match self {
            Stage::Processing => 0,
            Stage::Chunking => 1,
            Stage::Embedding => 2,
            Stage::Storing => 3,
        }
    }

    /// Label the backend uses on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Processing => "Processing",
            Stage::Chunking => "Chunking",
            Stage::Embedding => "Embedding",
            Stage::Storing => "Storing",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Processing => "Processing Data",
            Stage::Chunking => "Chunking Data",
            Stage::Embedding => "Embedding Data",
            Stage::Storing => "Storing Data",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Processing => "Analyzing data",
            Stage::Chunking => "Breaking pieces",
            Stage::Embedding => "Creating vectors",
            Stage::Storing => "Saving database",
        }
    }

    /// Whether completing this stage finishes the job.
    pub fn is_terminal(self) -> bool {
        self == Stage::Storing
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    /// Exact, case-sensitive match on the wire label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::CANONICAL
            .into_iter()
            .find(|stage| stage.label() == s)
            .ok_or_else(|| format!("unknown ingestion stage: '{s}'"))
    }
}

/// Lifecycle state of the ingestion progress tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum TrackerState {
    /// A job has started but no stage has been reported yet (or no job ever ran).
    #[default]
    Idle,
    /// The backend reported this stage.
    Stage(Stage),
    /// The job finished (terminal stage + grace delay) or was cancelled.
    Closed,
    /// The idle timeout expired, or the notification stream ended early.
    Failed,
}

impl TrackerState {
    pub fn stage(self) -> Option<Stage> {
        match self {
            TrackerState::Stage(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TrackerState::Closed | TrackerState::Failed)
    }
}

/// Read-only view of the tracker for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestionProgress {
    pub state: TrackerState,
    /// Position of the current stage in [`Stage::CANONICAL`].
    pub current_stage_index: usize,
    pub stage_completed: bool,
    pub active: bool,
}

impl IngestionProgress {
    /// Stage at `current_stage_index`, which is what a loader displays.
    pub fn current_stage(&self) -> Stage {
        Stage::CANONICAL[self.current_stage_index.min(Stage::CANONICAL.len() - 1)]
    }

    /// "Step N of M" numbering (1-based).
    pub fn step_number(&self) -> usize {
        self.current_stage_index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_indices_match_positions() {
        for (position, stage) in Stage::CANONICAL.iter().enumerate() {
            assert_eq!(stage.index(), position);
        }
    }

    #[test]
    fn test_stage_from_label() {
        assert_eq!("Embedding".parse::<Stage>().unwrap(), Stage::Embedding);
        assert_eq!("Storing".parse::<Stage>().unwrap(), Stage::Storing);
        assert!("Frobnicating".parse::<Stage>().is_err());
        assert!("storing".parse::<Stage>().is_err());
    }

    #[test]
    fn test_only_storing_is_terminal() {
        let terminal: Vec<_> = Stage::CANONICAL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![Stage::Storing]);
    }

    #[test]
    fn test_progress_current_stage() {
        let progress = IngestionProgress {
            state: TrackerState::Stage(Stage::Embedding),
            current_stage_index: 2,
            stage_completed: true,
            active: true,
        };
        assert_eq!(progress.current_stage(), Stage::Embedding);
        assert_eq!(progress.step_number(), 3);
    }

    #[test]
    fn test_default_progress_is_idle() {
        assert_eq!(TrackerState::default(), TrackerState::Idle);
        let progress = IngestionProgress::default();
        assert_eq!(progress.state, TrackerState::Idle);
        assert!(!progress.active);
        assert_eq!(progress.current_stage(), Stage::Processing);
    }

    #[test]
    fn test_tracker_state_serde() {
        let json = serde_json::to_string(&TrackerState::Stage(Stage::Chunking)).unwrap();
        assert_eq!(json, r#"{"state":"stage","stage":"Chunking"}"#);
        let json = serde_json::to_string(&TrackerState::Closed).unwrap();
        assert_eq!(json, r#"{"state":"closed"}"#);
    }
}
