//! `sqsh`: minify HTML, CSS and JavaScript files

use std::env;
use std::io::{Read, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, eyre};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;
use squish::config::ResolvedConfig;
use squish::{AssetKind, Minifier};
use tracing_subscriber::prelude::*;

/// Minify HTML, CSS and JavaScript
#[derive(Facet, Debug)]
struct Args {
    /// Asset kind: html, css or js (inferred from the file extension if empty)
    #[facet(args::named, args::short = 'k', default)]
    kind: String,

    /// Write output to this file instead of stdout
    #[facet(args::named, args::short = 'o', default)]
    output: String,

    /// Configuration file (default: discover `.config/squish.yaml`)
    #[facet(args::named, args::short = 'c', default)]
    config: String,

    /// Collapse all markup whitespace to single spaces
    #[facet(args::named)]
    max: bool,

    /// Keep `/*! */` comments
    #[facet(args::named)]
    keep_comments: bool,

    /// Exit non-zero instead of passing input through when minification fails
    #[facet(args::named)]
    strict: bool,

    /// Input files (`-` or nothing reads stdin)
    #[facet(args::positional, default)]
    files: Vec<String>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    facet_args::from_slice(&args_refs).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        "Failed to parse arguments".to_string()
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("squish=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();
    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok();
    init_tracing();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = if args.config.is_empty() {
        ResolvedConfig::discover()?
    } else {
        ResolvedConfig::load(Utf8Path::new(&args.config))?
    };

    let mut minifier = Minifier::from_config(&config);
    if args.max {
        minifier.html.max_minification = true;
    }
    if args.keep_comments {
        minifier.css.remove_comments = false;
        minifier.js.flagged_comments = true;
        minifier.html.remove_comments = false;
    }

    let forced = if args.kind.is_empty() {
        None
    } else {
        Some(args.kind.parse::<AssetKind>()?)
    };

    let inputs = if args.files.is_empty() {
        vec!["-".to_string()]
    } else {
        args.files
    };
    if !args.output.is_empty() && inputs.len() > 1 {
        return Err(eyre!("--output takes a single input, got {}", inputs.len()));
    }

    let mut minified = String::new();
    let mut failed = false;
    for input in &inputs {
        let (source, kind) = read_input(input, forced)?;
        if args.strict {
            match minifier.try_minify(kind, &source) {
                Ok(output) => minified.push_str(&output),
                Err(e) => {
                    eprintln!("{}: {input}: {e}", "error".red().bold());
                    failed = true;
                }
            }
        } else {
            minified.push_str(&minifier.minify_or_original(kind, &source));
        }
    }

    if args.output.is_empty() {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(minified.as_bytes())?;
        stdout.flush()?;
    } else {
        fs_err::write(&args.output, minified)?;
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn read_input(input: &str, forced: Option<AssetKind>) -> Result<(String, AssetKind)> {
    if input == "-" {
        let kind = forced.ok_or_else(|| eyre!("--kind is required when reading stdin"))?;
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok((source, kind));
    }

    let path = Utf8PathBuf::from(input);
    let kind = match forced {
        Some(kind) => kind,
        None => AssetKind::from_path(&path)
            .ok_or_else(|| eyre!("cannot tell what kind of asset {path} is, pass --kind"))?,
    };
    Ok((fs_err::read_to_string(&path)?, kind))
}
