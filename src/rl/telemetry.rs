// src/rl/telemetry.rs
//
// JSONL telemetry for training and evaluation runs.
//
// Records per-step policy inputs/outputs and rewards plus episode
// boundary markers (start/end, termination reason), one JSON object per
// line. Controlled by environment variables:
// - GOVTUNE_TELEMETRY_MODE: "off" (default) or "jsonl"
// - GOVTUNE_TELEMETRY_PATH: path to the JSONL file
//
// Telemetry failures disable the sink rather than failing the run.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::rl::params::GovernanceParams;

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// All steps of the episode ran.
    Completed,
    /// The external engine failed mid-episode.
    EngineFailure,
}

/// Per-step record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: usize,
    pub step: usize,
    /// Encoded state vector fed to the policy.
    pub state: Vec<f64>,
    /// Raw action vector sampled from the policy.
    pub action: Vec<f64>,
    pub reward: f64,
    pub done: bool,
    /// Thresholds after applying the action.
    pub params: GovernanceParams,
}

/// Episode boundary marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMarker {
    pub episode: usize,
    pub marker_type: EpisodeMarkerType,
    /// Agent RNG seed of the run (start markers only).
    pub seed: Option<u64>,
    /// Total episode reward (end markers only).
    pub episode_reward: Option<f64>,
    /// Termination reason (end markers only).
    pub termination_reason: Option<TerminationReason>,
    /// Steps that produced a transition (end markers only).
    pub steps_recorded: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EpisodeMarkerType {
    Start,
    End,
}

/// JSONL telemetry sink for tuner runs.
pub struct TunerTelemetry {
    enabled: bool,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl Default for TunerTelemetry {
    fn default() -> Self {
        Self::disabled()
    }
}

impl TunerTelemetry {
    /// Create a disabled sink.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: None,
            writer: None,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let enabled = env::var("GOVTUNE_TELEMETRY_MODE")
            .map(|s| s.to_lowercase() == "jsonl")
            .unwrap_or(false);

        let path = env::var("GOVTUNE_TELEMETRY_PATH").ok().map(PathBuf::from);

        Self {
            enabled,
            path,
            writer: None,
        }
    }

    /// Enable telemetry with a specific path.
    pub fn enable(path: PathBuf) -> Self {
        Self {
            enabled: true,
            path: Some(path),
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure_writer(&mut self) -> Option<&mut BufWriter<File>> {
        if !self.enabled {
            return None;
        }

        if self.writer.is_none() {
            let path = self.path.as_ref()?;

            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;

            self.writer = Some(BufWriter::new(file));
        }

        self.writer.as_mut()
    }

    fn write_json(&mut self, value: &JsonValue) {
        let Some(writer) = self.ensure_writer() else {
            return;
        };

        let line = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(_) => return,
        };

        if writeln!(writer, "{}", line).is_err() {
            self.enabled = false;
            self.writer = None;
        }
    }

    /// Log an episode start marker carrying the run seed.
    pub fn log_episode_start(&mut self, episode: usize, seed: u64) {
        let marker = EpisodeMarker {
            episode,
            marker_type: EpisodeMarkerType::Start,
            seed: Some(seed),
            episode_reward: None,
            termination_reason: None,
            steps_recorded: None,
        };
        let value = serde_json::to_value(&marker).unwrap_or_default();
        self.write_json(&value);
    }

    /// Log an episode end marker.
    pub fn log_episode_end(
        &mut self,
        episode: usize,
        episode_reward: f64,
        reason: TerminationReason,
        steps_recorded: usize,
    ) {
        let marker = EpisodeMarker {
            episode,
            marker_type: EpisodeMarkerType::End,
            seed: None,
            episode_reward: Some(episode_reward),
            termination_reason: Some(reason),
            steps_recorded: Some(steps_recorded),
        };
        let value = serde_json::to_value(&marker).unwrap_or_default();
        self.write_json(&value);
    }

    /// Log a step record.
    pub fn log_step(&mut self, record: &StepRecord) {
        let value = serde_json::to_value(record).unwrap_or_default();
        self.write_json(&value);
    }

    /// Flush the writer.
    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer {
            let _ = writer.flush();
        }
    }
}

impl Drop for TunerTelemetry {
    fn drop(&mut self) {
        self.flush();
    }
}
