use std::path::PathBuf;
use std::process;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gi_stubgen::error::StubError;
use gi_stubgen::repo::{Context, JsonBackend};

struct Args {
    namespaces: Vec<String>,
    meta: PathBuf,
    docs: Option<PathBuf>,
    out: PathBuf,
    dump_schema: bool,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!(
                "Usage: gi-stubgen <Namespace[-Version]>... --meta <dir> [--docs <file>] [--out <dir>] [--dump-schema]"
            );
            eprintln!();
            eprintln!("Arguments:");
            eprintln!("  <Namespace[-Version]>   GI namespace to generate stubs for (e.g. Gtk-4.0)");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --meta <dir>     Directory with <Namespace>[-<version>].json metadata");
            eprintln!("  --docs <file>    JSON documentation side-table");
            eprintln!("  --out <dir>      Output directory [default: .]");
            eprintln!("  --dump-schema    Also write the normalized schema as JSON");
            process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("gi_stubgen=info")
    };
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));
    let _ = subscriber.try_init();
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut namespaces = Vec::new();
    let mut meta: Option<PathBuf> = None;
    let mut docs: Option<PathBuf> = None;
    let mut out = PathBuf::from(".");
    let mut dump_schema = false;

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--meta" => {
                i += 1;
                meta = Some(PathBuf::from(args.get(i).ok_or("--meta requires a value")?));
            }
            "--docs" => {
                i += 1;
                docs = Some(PathBuf::from(args.get(i).ok_or("--docs requires a value")?));
            }
            "--out" => {
                i += 1;
                out = PathBuf::from(args.get(i).ok_or("--out requires a value")?);
            }
            "--dump-schema" => dump_schema = true,
            "--help" | "-h" => return Err("".to_string()),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => namespaces.push(arg.to_string()),
        }
        i += 1;
    }

    if namespaces.is_empty() {
        return Err("missing required argument: <Namespace[-Version]>".to_string());
    }
    let meta = meta.ok_or("missing required option: --meta <dir>")?;
    Ok(Args {
        namespaces,
        meta,
        docs,
        out,
        dump_schema,
    })
}

/// Split a "Gtk-4.0" style reference into namespace and optional version.
fn parse_namespace_ref(raw: &str) -> Result<(&str, Option<&str>), StubError> {
    let (namespace, version) = match raw.split_once('-') {
        Some((ns, version)) => (ns, Some(version)),
        None => (raw, None),
    };
    if namespace.is_empty() || version == Some("") {
        return Err(StubError::InvalidNamespaceRef(raw.to_string()));
    }
    Ok((namespace, version))
}

fn run(args: &Args) -> Result<(), StubError> {
    let mut ctx = Context::new(Box::new(JsonBackend::new(&args.meta)));
    if let Some(docs) = &args.docs {
        ctx.docs.load_from_file(docs)?;
    }

    std::fs::create_dir_all(&args.out)?;

    for raw in &args.namespaces {
        let (namespace, version) = parse_namespace_ref(raw)?;
        let (schema, text) = gi_stubgen::generate_stubs(&mut ctx, namespace, version)?;

        let stub_path = args.out.join(format!("{namespace}.pyi"));
        std::fs::write(&stub_path, &text)?;
        tracing::info!(namespace, path = %stub_path.display(), "stub written");

        if args.dump_schema {
            let json = serde_json::to_string_pretty(&schema)?;
            let schema_path = args.out.join(format!("{namespace}.schema.json"));
            std::fs::write(&schema_path, json)?;
            tracing::info!(namespace, path = %schema_path.display(), "schema dumped");
        }
    }

    Ok(())
}
