use drift_core::{
    Callbacks, Error, ErrorKind, LayoutEventKind, LayoutSession, MemoryView, Point, SessionState,
    Size,
};
use drift_remote::{
    RemoteLayout, RemoteLayoutOptions, RemoteOutcome, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Json(u16, Value),
    Raw(u16, &'static str),
    Fail(&'static str),
    Never,
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<TransportRequest>>>,
}

impl Scripted {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            delay: Duration::from_millis(10),
            calls: Arc::new(AtomicUsize::new(0)),
            last: Arc::new(Mutex::new(None)),
        }
    }

    fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for Scripted {
    fn send(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        let reply = self.reply.clone();
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            match reply {
                Reply::Json(status, body) => Ok(TransportResponse {
                    status,
                    body: serde_json::to_vec(&body).unwrap(),
                }),
                Reply::Raw(status, body) => Ok(TransportResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                }),
                Reply::Fail(message) => Err(TransportError::new(message)),
                Reply::Never => std::future::pending().await,
            }
        }
    }
}

fn view() -> MemoryView {
    MemoryView::new(Size::new(800.0, 600.0))
        .with_node("n1", 0.0, 0.0)
        .with_node("n2", 10.0, 10.0)
        .with_edge("n1", "n2")
}

fn options() -> RemoteLayoutOptions {
    RemoteLayoutOptions::default().with_url("http://layout.test/api")
}

#[derive(Default)]
struct Recorded {
    errors: Rc<RefCell<Vec<Error>>>,
    ready: Rc<RefCell<usize>>,
    stops: Rc<RefCell<usize>>,
}

impl Recorded {
    fn callbacks(&self) -> Callbacks {
        let errors = Rc::clone(&self.errors);
        let ready = Rc::clone(&self.ready);
        let stops = Rc::clone(&self.stops);
        Callbacks::default()
            .on_error(move |e| errors.borrow_mut().push(e.clone()))
            .on_ready(move || *ready.borrow_mut() += 1)
            .on_stop(move || *stops.borrow_mut() += 1)
    }
}

async fn apply(body: Value) -> MemoryView {
    let mut view = view();
    let mut layout = RemoteLayout::new(options(), Scripted::new(Reply::Json(200, body)));
    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Applied { applied: 1 });
    view
}

#[tokio::test(start_paused = true)]
async fn every_response_shape_applies_the_same_positions() {
    for body in [
        json!({ "positions": { "n1": { "x": 1, "y": 2 } } }),
        json!([{ "id": "n1", "x": 1, "y": 2 }]),
        json!({ "n1": { "x": 1, "y": 2 } }),
    ] {
        let view = apply(body).await;
        assert_eq!(view.position("n1"), Some(Point::new(1.0, 2.0)));
        assert_eq!(view.position("n2"), Some(Point::new(10.0, 10.0)));
    }
}

#[tokio::test(start_paused = true)]
async fn request_carries_graph_layout_and_options() {
    let transport = Scripted::new(Reply::Json(200, json!({})));
    let mut opts = options();
    opts.layout = "radial".to_string();
    opts.options = json!({ "spacing": 4 });
    opts.headers.insert("x-api-key".to_string(), "secret".to_string());
    let mut layout = RemoteLayout::new(opts, transport.clone());
    let mut view = view();

    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Applied { applied: 0 });
    let request = transport.last.lock().unwrap().clone().unwrap();
    assert_eq!(request.url, "http://layout.test/api");
    assert_eq!(request.method, "POST");
    assert_eq!(request.headers.get("x-api-key").map(String::as_str), Some("secret"));
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["layout"], "radial");
    assert_eq!(body["options"]["spacing"], 4);
    assert_eq!(body["graph"]["nodes"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["graph"]["edges"][0]["source"], "n1");
}

#[tokio::test(start_paused = true)]
async fn successful_run_emits_the_full_lifecycle_once() {
    let recorded = Recorded::default();
    let mut view = view();
    let mut layout = RemoteLayout::new(
        options(),
        Scripted::new(Reply::Json(
            200,
            json!({ "n1": { "x": 5, "y": 6 }, "n2": { "x": 7, "y": 8 } }),
        )),
    )
    .with_callbacks(recorded.callbacks());

    let outcome = layout.run(&mut view).await;
    assert_eq!(outcome, RemoteOutcome::Applied { applied: 2 });
    assert_eq!(layout.state(), SessionState::Terminated);
    let kinds: Vec<_> = view.events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![LayoutEventKind::Start, LayoutEventKind::Ready, LayoutEventKind::Stop]
    );
    assert!(view.events().iter().all(|e| e.layout == "remote"));
    assert_eq!(*recorded.ready.borrow(), 1);
    assert_eq!(*recorded.stops.borrow(), 1);
    assert!(recorded.errors.borrow().is_empty());
    assert_eq!(view.fits(), &[30.0]);
    assert_eq!(layout.applied_positions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unmatched_ids_are_ignored() {
    let mut view = view();
    let mut layout = RemoteLayout::new(
        options(),
        Scripted::new(Reply::Json(
            200,
            json!({ "ghost": { "x": 1, "y": 1 }, "n2": { "x": 2, "y": 3 } }),
        )),
    );
    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Applied { applied: 1 });
    assert_eq!(view.position("n1"), Some(Point::new(0.0, 0.0)));
    assert_eq!(view.position("n2"), Some(Point::new(2.0, 3.0)));
    assert!(view.position("ghost").is_none());
}

#[tokio::test(start_paused = true)]
async fn never_responding_endpoint_times_out_once() {
    let recorded = Recorded::default();
    let mut view = view();
    let mut layout = RemoteLayout::new(
        options().with_timeout(Duration::from_millis(100)),
        Scripted::new(Reply::Never),
    )
    .with_callbacks(recorded.callbacks());

    let started = tokio::time::Instant::now();
    let outcome = layout.run(&mut view).await;
    assert_eq!(outcome, RemoteOutcome::Failed(ErrorKind::Timeout));
    let waited = started.elapsed();
    assert!(
        waited >= Duration::from_millis(100) && waited <= Duration::from_millis(101),
        "{waited:?}"
    );

    let errors = recorded.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], Error::Timeout { after_ms: 100 });
    assert!(errors[0].to_string().contains("timed out"));
    assert!(view.writes().is_empty());
    assert_eq!(view.count_events(LayoutEventKind::Ready), 0);
    assert_eq!(view.count_events(LayoutEventKind::Stop), 1);
    assert_eq!(*recorded.stops.borrow(), 1);
}

#[tokio::test(start_paused = true)]
async fn response_inside_the_deadline_wins() {
    let mut view = view();
    let mut layout = RemoteLayout::new(
        options().with_timeout(Duration::from_millis(100)),
        Scripted::new(Reply::Json(200, json!({ "n1": { "x": 9, "y": 9 } })))
            .after(Duration::from_millis(99)),
    );
    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Applied { applied: 1 });
}

#[tokio::test(start_paused = true)]
async fn missing_url_fails_without_a_call() {
    let recorded = Recorded::default();
    let transport = Scripted::new(Reply::Json(200, json!({})));
    let mut view = view();
    let mut layout = RemoteLayout::new(RemoteLayoutOptions::default(), transport.clone())
        .with_callbacks(recorded.callbacks());

    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Failed(ErrorKind::Config));
    assert_eq!(transport.calls(), 0);
    assert_eq!(view.count_events(LayoutEventKind::Start), 1);
    assert_eq!(view.count_events(LayoutEventKind::Stop), 1);
    assert_eq!(recorded.errors.borrow().len(), 1);
    assert_eq!(layout.state(), SessionState::Terminated);
}

#[tokio::test(start_paused = true)]
async fn non_success_status_carries_the_body() {
    let recorded = Recorded::default();
    let mut view = view();
    let mut layout = RemoteLayout::new(options(), Scripted::new(Reply::Raw(503, "overloaded")))
        .with_callbacks(recorded.callbacks());

    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Failed(ErrorKind::Transport));
    assert_eq!(
        recorded.errors.borrow()[0],
        Error::Transport {
            status: 503,
            body: "overloaded".to_string()
        }
    );
    assert!(view.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn network_failure_is_a_transport_error() {
    let mut view = view();
    let mut layout = RemoteLayout::new(options(), Scripted::new(Reply::Fail("connection reset")));
    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Failed(ErrorKind::Transport));
    assert_eq!(view.count_events(LayoutEventKind::Stop), 1);
}

#[tokio::test(start_paused = true)]
async fn malformed_responses_apply_nothing() {
    for reply in [
        Reply::Raw(200, "<html>"),
        Reply::Json(200, json!(42)),
        Reply::Json(200, json!({ "positions": [1, 2] })),
        Reply::Json(200, json!({ "n1": { "x": 1, "y": 1 }, "n2": "oops" })),
    ] {
        let mut view = view();
        let mut layout = RemoteLayout::new(options(), Scripted::new(reply.clone()));
        assert_eq!(
            layout.run(&mut view).await,
            RemoteOutcome::Failed(ErrorKind::ResponseShape),
            "{reply:?}"
        );
        assert!(view.writes().is_empty(), "{reply:?}");
        assert_eq!(view.count_events(LayoutEventKind::Ready), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn abort_discards_the_late_response() {
    let recorded = Recorded::default();
    let mut view = view();
    let mut layout = RemoteLayout::new(
        options(),
        Scripted::new(Reply::Json(200, json!({ "n1": { "x": 1, "y": 2 } })))
            .after(Duration::from_millis(200)),
    )
    .with_callbacks(recorded.callbacks());
    let handle = layout.stop_handle();

    let (outcome, ()) = tokio::join!(layout.run(&mut view), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
    });
    assert_eq!(outcome, RemoteOutcome::Aborted);
    assert!(view.writes().is_empty());
    assert_eq!(view.count_events(LayoutEventKind::Ready), 0);
    assert_eq!(view.count_events(LayoutEventKind::Stop), 1);
    assert_eq!(*recorded.stops.borrow(), 1);
    assert!(recorded.errors.borrow().is_empty());

    layout.stop(&mut view);
    assert_eq!(view.count_events(LayoutEventKind::Stop), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_abort_does_not_cancel_the_next_run() {
    let mut view = view();
    let mut layout = RemoteLayout::new(
        options(),
        Scripted::new(Reply::Json(200, json!({ "n1": { "x": 1, "y": 2 } }))),
    );
    layout.stop(&mut view);
    assert_eq!(view.count_events(LayoutEventKind::Stop), 0);
    assert_eq!(layout.state(), SessionState::Idle);

    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Applied { applied: 1 });
    assert_eq!(layout.run(&mut view).await, RemoteOutcome::Applied { applied: 1 });
    assert_eq!(view.count_events(LayoutEventKind::Start), 2);
    assert_eq!(view.count_events(LayoutEventKind::Stop), 2);
}

#[tokio::test(start_paused = true)]
async fn animated_runs_tween_and_skip_fit_when_disabled() {
    let mut opts = options();
    opts.common.animate = true;
    opts.common.fit = false;
    opts.animation_duration = 250;
    let mut view = view();
    let mut layout = RemoteLayout::new(
        opts,
        Scripted::new(Reply::Json(200, json!({ "n1": { "x": 4, "y": 4 } }))),
    );

    layout.run(&mut view).await;
    assert_eq!(view.animations(), &[Duration::from_millis(250)]);
    assert_eq!(view.position("n1"), Some(Point::new(4.0, 4.0)));
    assert!(view.fits().is_empty());
}
