use anyhow::Context;
use sanitizer::{Policy, Sanitizer};
use std::io::{Read, Write};
use tracing::{debug, info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: sanitize [OPTIONS] [INPUT] [OUTPUT]

Reads an HTML fragment from INPUT (or stdin) and writes the sanitized
fragment to OUTPUT (or stdout).

Options:
  --tags a,b,...      allowed tag names
  --attrs x,y,...     allowed attribute names
  --strip-all         allow nothing, leaving only text
  --allow-empty       accept an empty --tags or --attrs list
  --max-bytes N       reject larger inputs
  -t, --trace         log to stderr (filter with RUST_LOG)
  -h, --help          show this message";

struct Args {
    pub input: Option<String>,
    pub output: Option<String>,
    pub tags: Vec<String>,
    pub attributes: Vec<String>,
    pub strip_all: bool,
    pub allow_empty: bool,
    pub max_bytes: Option<usize>,
    pub trace: bool,
}

fn main() {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return;
        }
        Err(err) => {
            eprintln!("error: {}\n\n{}", err, USAGE);
            std::process::exit(2);
        }
    };
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .finish()
            .init();
        info!("Logger initialized");
    }

    if let Err(err) = run(args) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn parse_list(value: &str) -> Result<Vec<String>, String> {
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let args = Args {
        tags: pargs.opt_value_from_fn("--tags", parse_list)?.unwrap_or_default(),
        attributes: pargs.opt_value_from_fn("--attrs", parse_list)?.unwrap_or_default(),
        strip_all: pargs.contains("--strip-all"),
        allow_empty: pargs.contains("--allow-empty"),
        max_bytes: pargs.opt_value_from_str("--max-bytes")?,
        trace: pargs.contains(["--trace", "-t"]),
        input: pargs.opt_free_from_str()?,
        output: pargs.opt_free_from_str()?,
    };
    let rest = pargs.finish();
    if !rest.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments {:?}", rest),
        });
    }
    Ok(Some(args))
}

fn build_policy(args: &Args) -> sanitizer::Result<Policy> {
    if args.strip_all {
        return Ok(Policy::strip_all());
    }
    Policy::builder()
        .tags(&args.tags)
        .attributes(&args.attributes)
        .allow_empty(args.allow_empty)
        .build()
}

fn run(args: Args) -> anyhow::Result<()> {
    let policy = build_policy(&args)?;
    debug!(
        tags = ?policy.allowed_tags().collect::<Vec<_>>(),
        attributes = ?policy.allowed_attributes().collect::<Vec<_>>(),
        "Policy built"
    );
    let mut sanitizer = Sanitizer::new();
    if let Some(max) = args.max_bytes {
        sanitizer = sanitizer.max_input_len(max);
    }

    let input = match &args.input {
        Some(path) => std::fs::read(path).with_context(|| format!("could not read {}", path))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("could not read stdin")?;
            buf
        }
    };
    let output = sanitizer.sanitize_bytes(&input, &policy)?;

    let span = span!(Level::DEBUG, "Writing result");
    let _enter = span.enter();
    match &args.output {
        Some(path) => {
            std::fs::write(path, output).with_context(|| format!("could not write {}", path))?
        }
        None => std::io::stdout()
            .write_all(output.as_bytes())
            .context("could not write stdout")?,
    }
    Ok(())
}
