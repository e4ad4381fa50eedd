use std::io::Write;
use std::path::PathBuf;
use svgdata_core::{ParseError, WriteError, parse_document, render_document};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, thiserror::Error)]
enum DumpError {
    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

enum Mode {
    Json,
    Render { pretty: bool },
}

const USAGE: &str = "usage: svg_dump [--json | --render | --pretty] <file.svg>";

fn run(mode: Mode, path: PathBuf) -> Result<(), DumpError> {
    let data = std::fs::read(&path).map_err(|source| DumpError::Read {
        path: path.clone(),
        source,
    })?;
    let root = parse_document(&data)?;

    let mut stdout = std::io::stdout().lock();
    match mode {
        Mode::Json => {
            serde_json::to_writer_pretty(&mut stdout, &root)?;
        }
        Mode::Render { pretty } => {
            stdout.write_all(&render_document(&root, pretty)?)?;
        }
    }
    writeln!(stdout)?;
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svgdata_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let (mode, file) = match (args.next(), args.next()) {
        (Some(flag), Some(file)) if flag == "--json" => (Mode::Json, file),
        (Some(flag), Some(file)) if flag == "--render" => (Mode::Render { pretty: false }, file),
        (Some(flag), Some(file)) if flag == "--pretty" => (Mode::Render { pretty: true }, file),
        (Some(file), None) if !file.starts_with("--") => (Mode::Json, file),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(mode, PathBuf::from(file)) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
