use drift::force::{ForceLayout, ForceLayoutOptions};
use drift::layered::{LayeredLayout, LayeredLayoutOptions};
use drift::remote::{HttpTransport, RemoteLayout, RemoteLayoutOptions, RemoteOutcome};
use drift::{Callbacks, EdgeSnapshot, MemoryView, NodeId, NodeSnapshot, Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Read;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Input(String),
    Layout(drift::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Input(msg) => write!(f, "invalid input graph: {msg}"),
            CliError::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<drift::Error> for CliError {
    fn from(value: drift::Error) -> Self {
        Self::Layout(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Force,
    Layered,
    Remote,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    options: Option<String>,
    url: Option<String>,
    timeout: Option<u64>,
    pretty: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "drift-cli\n\
\n\
USAGE:\n\
  drift-cli [force] [--options <json>] [--pretty] [--out <path>] [<path>|-]\n\
  drift-cli layered [--options <json>] [--pretty] [--out <path>] [<path>|-]\n\
  drift-cli remote --url <url> [--timeout <ms>] [--options <json>] [--pretty] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph is read from stdin.\n\
  - Input: {\"nodes\":[{\"id\",\"x\"?,\"y\"?,\"width\"?,\"height\"?,\"parent\"?,\"locked\"?}],\n\
    \"edges\":[{\"id\"?,\"source\",\"target\"}],\"viewport\"?:{\"width\",\"height\"}}.\n\
  - Nodes without x/y start at the origin; pass --options '{\"randomize\":true}' to scatter them.\n\
  - --options takes the layout's JSON options, merged over its defaults.\n\
  - force runs until its budget ends; an infinite layout is rejected.\n\
  - Set DRIFT_LOG (e.g. DRIFT_LOG=debug) to log to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "force" => args.command = Command::Force,
            "layered" => args.command = Command::Layered,
            "remote" => args.command = Command::Remote,
            "--pretty" => args.pretty = true,
            "--options" => {
                let Some(json) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options = Some(json.clone());
            }
            "--url" => {
                let Some(url) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.url = Some(url.clone());
            }
            "--timeout" => {
                let Some(ms) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.timeout = Some(ms.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeIn {
    id: String,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeIn {
    #[serde(default)]
    id: Option<String>,
    source: String,
    target: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphIn {
    nodes: Vec<NodeIn>,
    #[serde(default)]
    edges: Vec<EdgeIn>,
    #[serde(default)]
    viewport: Option<Size>,
}

fn build_view(graph: GraphIn) -> Result<MemoryView, CliError> {
    let mut view = MemoryView::new(graph.viewport.unwrap_or(Size::new(800.0, 600.0)));
    let mut seen = std::collections::BTreeSet::new();
    for n in graph.nodes {
        if !seen.insert(n.id.clone()) {
            return Err(CliError::Input(format!("duplicate node id `{}`", n.id)));
        }
        let mut node = NodeSnapshot::new(n.id, Point::new(n.x.unwrap_or(0.0), n.y.unwrap_or(0.0)));
        if let Some(w) = n.width {
            node.width = w;
        }
        if let Some(h) = n.height {
            node.height = h;
        }
        node.parent = n.parent.map(NodeId::new);
        node.locked = n.locked;
        node.data = n.data;
        view.add_node(node);
    }
    for (i, e) in graph.edges.into_iter().enumerate() {
        let id = e.id.unwrap_or_else(|| format!("e{i}"));
        let mut edge = EdgeSnapshot::new(id, e.source, e.target);
        edge.data = e.data;
        view.add_edge(edge);
    }
    Ok(view)
}

/// Options JSON merged over the layout's defaults (missing keys keep their default).
fn layout_options<T: serde::de::DeserializeOwned + Default>(
    raw: Option<&str>,
) -> Result<T, CliError> {
    match raw {
        None => Ok(T::default()),
        Some(raw) => Ok(serde_json::from_str(raw)?),
    }
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    positions: &'a BTreeMap<NodeId, Point>,
    events: Vec<&'static str>,
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    match out {
        None => print!("{text}"),
        Some(path) => std::fs::write(path, text)?,
    }
    Ok(())
}

fn run_remote(view: &mut MemoryView, args: &Args) -> Result<(), CliError> {
    let mut options: RemoteLayoutOptions = layout_options(args.options.as_deref())?;
    if let Some(url) = &args.url {
        options.url = Some(url.clone());
    }
    if let Some(ms) = args.timeout {
        options.timeout = Some(ms);
    }

    let transport = HttpTransport::new().map_err(drift::Error::from)?;
    let failure: Rc<RefCell<Option<drift::Error>>> = Rc::default();
    let callbacks = {
        let failure = Rc::clone(&failure);
        Callbacks::default().on_error(move |err| *failure.borrow_mut() = Some(err.clone()))
    };
    let mut layout = RemoteLayout::new(options, transport).with_callbacks(callbacks);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(layout.run(view));
    tracing::debug!(?outcome, "remote layout finished");
    match outcome {
        RemoteOutcome::Applied { .. } | RemoteOutcome::Aborted => Ok(()),
        RemoteOutcome::Failed(kind) => match failure.borrow_mut().take() {
            Some(err) => Err(CliError::Layout(err)),
            None => Err(CliError::Input(format!("remote layout failed ({kind:?})"))),
        },
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let graph: GraphIn = serde_json::from_str(&text)?;
    let mut view = build_view(graph)?;

    match args.command {
        Command::Force => {
            let options: ForceLayoutOptions = layout_options(args.options.as_deref())?;
            ForceLayout::new(options).run_to_completion(&mut view)?;
        }
        Command::Layered => {
            let options: LayeredLayoutOptions = layout_options(args.options.as_deref())?;
            LayeredLayout::new(options).run(&mut view)?;
        }
        Command::Remote => run_remote(&mut view, &args)?,
    }

    let positions = view.positions();
    let out = LayoutOut {
        positions: &positions,
        events: view.events().iter().map(|e| e.kind.as_str()).collect(),
    };
    write_json(&out, args.pretty, args.out.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DRIFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("drift-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_remote_flags() {
        let args = parse_args(&argv(&[
            "remote",
            "--url",
            "http://localhost:9000",
            "--timeout",
            "250",
            "graph.json",
        ]))
        .unwrap();
        assert!(matches!(args.command, Command::Remote));
        assert_eq!(args.url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(args.timeout, Some(250));
        assert_eq!(args.input.as_deref(), Some("graph.json"));
    }

    #[test]
    fn rejects_unknown_flags_and_extra_inputs() {
        assert!(matches!(
            parse_args(&argv(&["--bogus"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["a.json", "b.json"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["--timeout", "soon"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn missing_coordinates_default_to_origin() {
        let graph: GraphIn = serde_json::from_str(
            r#"{"nodes":[{"id":"a"},{"id":"b","x":3,"y":4,"width":10}],"edges":[{"source":"a","target":"b"}]}"#,
        )
        .unwrap();
        let view = build_view(graph).unwrap();
        assert_eq!(view.position("a"), Some(Point::new(0.0, 0.0)));
        assert_eq!(view.position("b"), Some(Point::new(3.0, 4.0)));
        use drift::GraphView;
        assert_eq!(view.edges()[0].id.as_str(), "e0");
        assert_eq!(view.nodes()[1].width, 10.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let graph: GraphIn =
            serde_json::from_str(r#"{"nodes":[{"id":"a"},{"id":"a"}]}"#).unwrap();
        assert!(matches!(build_view(graph), Err(CliError::Input(_))));
    }
}
