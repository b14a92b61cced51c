//! Runtime tunables for the learn core.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_VIDEO_COMPLETION_THRESHOLD: f64 = 0.8;
pub const DEFAULT_PASSING_SCORE: u32 = 70;

#[derive(Debug, Clone)]
pub struct LearnConfig {
    /// Share of a video's duration that counts as watched through.
    pub video_completion_threshold: f64,
    /// Passing score applied when quiz content does not set one.
    pub default_passing_score: u32,
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            video_completion_threshold: DEFAULT_VIDEO_COMPLETION_THRESHOLD,
            default_passing_score: DEFAULT_PASSING_SCORE,
        }
    }
}

impl LearnConfig {
    /// Load overrides from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(value) = env::var("LEARN_VIDEO_COMPLETION_THRESHOLD") {
            config.video_completion_threshold = value
                .parse()
                .context("LEARN_VIDEO_COMPLETION_THRESHOLD must be a number")?;
        }
        if let Ok(value) = env::var("LEARN_DEFAULT_PASSING_SCORE") {
            config.default_passing_score = value
                .parse()
                .context("LEARN_DEFAULT_PASSING_SCORE must be an integer")?;
        }
        Ok(config)
    }
}
