use drift_core::{CommonOptions, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Direction ranks advance in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "tb")]
    TopBottom,
    #[serde(rename = "LR", alias = "lr")]
    LeftRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spacing {
    /// Gap between neighbours in the same rank.
    pub node_sep: f64,
    /// Gap between consecutive ranks.
    pub rank_sep: f64,
    #[serde(rename = "rankDir")]
    pub direction: Direction,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            node_sep: 50.0,
            rank_sep: 50.0,
            direction: Direction::TopBottom,
        }
    }
}

impl Spacing {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("nodeSep", self.node_sep), ("rankSep", self.rank_sep)] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::config(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Options for [`crate::LayeredLayout`]. Snapshotted at `run()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayeredLayoutOptions {
    #[serde(flatten)]
    pub common: CommonOptions,
    #[serde(flatten)]
    pub spacing: Spacing,
    /// Tween duration in milliseconds when `animate` is set.
    pub animation_duration: u64,
}

impl Default for LayeredLayoutOptions {
    fn default() -> Self {
        Self {
            common: CommonOptions::default(),
            spacing: Spacing::default(),
            animation_duration: 500,
        }
    }
}

impl LayeredLayoutOptions {
    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }

    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        self.spacing.validate()
    }
}
