use anyhow::{Context, Result, bail};
use log::{debug, info};
use notedown_config::{Config, FlavourName};
use notedown_html::render_to_html;
use notedown_syntax::tree::debug_tree;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{env, io, process};

const USAGE: &str = "\
Usage:
  notedown-cli render <file> [--commonmark|--gfm] [--unsafe-links] [--base-uri URI] [--absolutize-anchors]
  notedown-cli tree <file> [--commonmark|--gfm]

Use - as <file> to read standard input.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Render,
    Tree,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    input: PathBuf,
    flavour: Option<FlavourName>,
    unsafe_links: bool,
    base_uri: Option<String>,
    absolutize_anchors: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut rest = args.iter();
    let command = match rest.next().map(String::as_str) {
        Some("render") => Command::Render,
        Some("tree") => Command::Tree,
        Some(other) => bail!("unknown command '{other}'"),
        None => bail!("missing command"),
    };

    let mut input = None;
    let mut parsed = Args {
        command,
        input: PathBuf::new(),
        flavour: None,
        unsafe_links: false,
        base_uri: None,
        absolutize_anchors: false,
    };
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--commonmark" => parsed.flavour = Some(FlavourName::CommonMark),
            "--gfm" => parsed.flavour = Some(FlavourName::Gfm),
            "--unsafe-links" => parsed.unsafe_links = true,
            "--absolutize-anchors" => parsed.absolutize_anchors = true,
            "--base-uri" => {
                let uri = rest.next().context("--base-uri needs a value")?;
                parsed.base_uri = Some(uri.clone());
            }
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument '{extra}'"),
        }
    }
    parsed.input = input.context("missing input file")?;
    Ok(parsed)
}

/// Command line flags take precedence over the config file.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(flavour) = args.flavour {
        config.flavour = flavour;
    }
    if args.unsafe_links {
        config.render.safe_links = false;
    }
    if args.absolutize_anchors {
        config.render.absolutize_anchor_links = true;
    }
    if let Some(uri) = &args.base_uri {
        config.render.base_uri = Some(uri.clone());
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read '{}'", input.display()))
}

fn run(args: &[String]) -> Result<()> {
    let args = parse_args(args).with_context(|| USAGE.to_string())?;

    let mut config = match Config::load().context("Failed to load config file")? {
        Some(config) => {
            debug!("using config from {}", Config::config_path().display());
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);

    let text = read_input(&args.input)?;
    let parser = config.parser();
    let tree = parser
        .parse(&text)
        .with_context(|| format!("Failed to parse '{}'", args.input.display()))?;

    let output = match args.command {
        Command::Render => render_to_html(&tree, &text, &config.render_options()),
        Command::Tree => debug_tree(&tree),
    };
    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    info!("{} done for {}", parser.flavour().name(), args.input.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("Error: {err:?}");
        process::exit(1);
    }
}
