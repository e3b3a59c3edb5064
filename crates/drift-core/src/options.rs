use crate::error::{Error, Result};
use crate::geom::BoundingBoxSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options every driver understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonOptions {
    /// Write positions through to the view while the layout runs instead of once at the end.
    pub animate: bool,
    /// Fit the viewport to the laid-out nodes when the run ends.
    pub fit: bool,
    pub padding: f64,
    pub bounding_box: Option<BoundingBoxSpec>,
    /// Scatter nodes inside the bounding box before the first step.
    pub randomize: bool,
    pub random_seed: u64,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            animate: false,
            fit: true,
            padding: 30.0,
            bounding_box: None,
            randomize: false,
            random_seed: 0,
        }
    }
}

impl CommonOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(Error::config(format!(
                "padding must be a non-negative number, got {}",
                self.padding
            )));
        }
        Ok(())
    }
}

type ProgressFn = Box<dyn FnMut(f64)>;
type NotifyFn = Box<dyn FnMut()>;
type ErrorFn = Box<dyn FnMut(&Error)>;

/// Host callbacks. Unlike options these are not serializable and stay with the driver.
#[derive(Default)]
pub struct Callbacks {
    pub ready: Option<NotifyFn>,
    pub stop: Option<NotifyFn>,
    pub tick: Option<ProgressFn>,
    pub error: Option<ErrorFn>,
}

impl Callbacks {
    pub fn on_ready(mut self, f: impl FnMut() + 'static) -> Self {
        self.ready = Some(Box::new(f));
        self
    }

    pub fn on_stop(mut self, f: impl FnMut() + 'static) -> Self {
        self.stop = Some(Box::new(f));
        self
    }

    pub fn on_tick(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.tick = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&Error) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn ready(&mut self) {
        if let Some(f) = self.ready.as_mut() {
            f();
        }
    }

    pub fn stop(&mut self) {
        if let Some(f) = self.stop.as_mut() {
            f();
        }
    }

    pub fn tick(&mut self, progress: f64) {
        if let Some(f) = self.tick.as_mut() {
            f(progress);
        }
    }

    pub fn error(&mut self, err: &Error) {
        if let Some(f) = self.error.as_mut() {
            f(err);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("ready", &self.ready.is_some())
            .field("stop", &self.stop.is_some())
            .field("tick", &self.tick.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
