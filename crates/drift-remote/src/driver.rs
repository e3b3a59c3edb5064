use crate::abort::AbortSource;
use crate::envelope::RemoteRequest;
use crate::options::RemoteLayoutOptions;
use crate::response::ResponseShape;
use crate::transport::{Transport, TransportRequest};
use drift_core::{
    Callbacks, Error, ErrorKind, GraphView, LayoutEvent, LayoutEventKind, LayoutSession,
    Lifecycle, NodeId, Point, Result, SessionState,
};
use std::collections::BTreeMap;
use std::time::Duration;

pub const LAYOUT_NAME: &str = "remote";

/// How a remote run ended. Failures have already been reported through the error callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Positions were applied to `applied` view nodes.
    Applied { applied: usize },
    /// The session was stopped before a response could be applied.
    Aborted,
    Failed(ErrorKind),
}

/// Delegates layout to an external service.
///
/// One outbound call per session. The call races the configured deadline and the driver's
/// abort signal; whichever finishes first decides the outcome, and `layoutstop` fires exactly
/// once on every path.
pub struct RemoteLayout<T> {
    options: RemoteLayoutOptions,
    callbacks: Callbacks,
    transport: T,
    lifecycle: Lifecycle,
    abort: AbortSource,
    applied: BTreeMap<NodeId, Point>,
}

impl<T: Transport> RemoteLayout<T> {
    pub fn new(options: RemoteLayoutOptions, transport: T) -> Self {
        Self {
            options,
            callbacks: Callbacks::default(),
            transport,
            lifecycle: Lifecycle::new(),
            abort: AbortSource::new(),
            applied: BTreeMap::new(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn options(&self) -> &RemoteLayoutOptions {
        &self.options
    }

    /// Edits take effect on the next `run()`.
    pub fn options_mut(&mut self) -> &mut RemoteLayoutOptions {
        &mut self.options
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// A handle that aborts the in-flight session from outside the `run()` future.
    ///
    /// Aborting while no call is pending has no effect on later runs.
    pub fn stop_handle(&self) -> AbortSource {
        self.abort.clone()
    }

    /// Positions written by the last successful run.
    pub fn applied_positions(&self) -> &BTreeMap<NodeId, Point> {
        &self.applied
    }

    pub async fn run(&mut self, view: &mut dyn GraphView) -> RemoteOutcome {
        if self.lifecycle.is_active() {
            // A previous `run()` future was dropped mid-call.
            self.finalize(view);
        }
        self.abort.reset();
        self.applied.clear();
        let generation = match self.lifecycle.begin() {
            Ok(g) => g,
            Err(err) => return self.fail(err),
        };
        view.emit(LayoutEvent::new(LayoutEventKind::Start, LAYOUT_NAME));
        tracing::debug!(generation, "remote layout started");

        let outcome = match self.execute(view).await {
            Ok(Some(applied)) => RemoteOutcome::Applied { applied },
            Ok(None) => {
                tracing::debug!(generation, "remote layout aborted");
                RemoteOutcome::Aborted
            }
            Err(err) => self.fail(err),
        };
        self.finalize(view);
        outcome
    }

    async fn execute(&mut self, view: &mut dyn GraphView) -> Result<Option<usize>> {
        let options = self.options.clone();
        let url = options.validate()?;
        let snapshot = view.snapshot();
        snapshot.validate()?;

        let envelope =
            RemoteRequest::from_snapshot(&snapshot, &options.layout, options.options.clone());
        let body = envelope
            .to_body()
            .map_err(|e| Error::config(format!("failed to encode layout request: {e}")))?;
        let request = TransportRequest {
            url: url.to_string(),
            method: options.method.clone(),
            headers: options.headers.clone(),
            body,
        };

        self.lifecycle.mark_running()?;
        tracing::debug!(
            url = %url,
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "requesting remote layout"
        );

        let signal = self.abort.signal();
        let deadline = options.deadline();
        let response = tokio::select! {
            biased;
            _ = signal.aborted() => return Ok(None),
            result = self.transport.send(&request) => result?,
            _ = expire(deadline) => {
                let after_ms = deadline.map_or(0, |d| d.as_millis() as u64);
                return Err(Error::Timeout { after_ms });
            }
        };
        if signal.is_aborted() {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(Error::Transport {
                status: response.status,
                body: response.body_text(),
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| Error::response_shape(format!("response body is not JSON: {e}")))?;
        let shape = ResponseShape::detect(value, &options.response_positions_key)?;
        tracing::trace!(shape = shape.name(), "parsed layout response");
        let positions = shape.into_positions()?;

        let known = snapshot.node_ids();
        let matched: BTreeMap<NodeId, Point> = positions
            .into_iter()
            .filter(|(id, _)| known.contains(id))
            .collect();
        if options.common.animate {
            view.animate_positions(&matched, options.animation());
        } else {
            for (id, p) in &matched {
                view.set_position(id, *p);
            }
        }
        if options.common.fit {
            view.fit(options.common.padding);
        }
        let applied = matched.len();
        self.applied = matched;

        view.emit(LayoutEvent::new(LayoutEventKind::Ready, LAYOUT_NAME));
        self.callbacks.ready();
        Ok(Some(applied))
    }

    fn fail(&mut self, err: Error) -> RemoteOutcome {
        tracing::warn!(error = %err, "remote layout failed");
        self.callbacks.error(&err);
        RemoteOutcome::Failed(err.kind())
    }

    fn finalize(&mut self, view: &mut dyn GraphView) {
        if !self.lifecycle.terminate() {
            return;
        }
        view.emit(LayoutEvent::new(LayoutEventKind::Stop, LAYOUT_NAME));
        self.callbacks.stop();
        tracing::debug!(generation = self.lifecycle.generation(), "remote layout stopped");
    }
}

async fn expire(deadline: Option<Duration>) {
    match deadline {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

impl<T: Transport> LayoutSession for RemoteLayout<T> {
    fn name(&self) -> &str {
        LAYOUT_NAME
    }

    fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    fn stop(&mut self, view: &mut dyn GraphView) {
        self.abort.abort();
        self.finalize(view);
    }
}
