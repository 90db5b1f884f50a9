//! tessera command-line front end.
//!
//! Reads a measured document snapshot and writes the files of one target:
//! - `android`: layout XML and value resources under `res/`
//! - `chrome`: the re-serialised document plus an asset manifest

mod sink;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use owo_colors::OwoColorize;
use serde::Deserialize;
use tessera_android::AndroidSettings;
use tessera_chrome::{Bundle, ChromeBundler, ChromeSettings};
use tessera_common::warning::warning_count;
use tessera_dom::Snapshot;
use tessera_layout::{OutputFile, OutputSink};

use sink::DirectorySink;

/// File name of the chrome asset manifest.
const MANIFEST_FILENAME: &str = "assets.json";

/// tessera: translate a measured HTML document into native layouts
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Android layout files into ./out
    tessera page.json

    # Static web bundle into ./site
    tessera page.json --target chrome --out site

    # List what would be written, with settings from a file
    tessera page.json --settings tessera.toml --dry-run
"#)]
struct Cli {
    /// Snapshot JSON produced by the measuring browser
    #[arg(value_name = "SNAPSHOT")]
    snapshot: PathBuf,

    /// Output target
    #[arg(short, long, value_enum, default_value_t = Target::Android)]
    target: Target,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    out: PathBuf,

    /// TOML file with `[android]` and `[chrome]` settings tables
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Log pipeline decisions (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the files that would be written without writing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Android,
    Chrome,
}

/// Contents of the `--settings` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    android: AndroidSettings,
    chrome: ChromeSettings,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(cli.settings.as_deref())?;
    let json = fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("failed to read {}", cli.snapshot.display()))?;
    let snapshot = Snapshot::from_json(&json).with_context(|| format!("failed to parse {}", cli.snapshot.display()))?;

    let files = match cli.target {
        Target::Android => android(snapshot, settings.android)?,
        Target::Chrome => chrome(snapshot, settings.chrome)?,
    };

    if cli.dry_run {
        for file in &files {
            println!("{} {}", "would write".yellow(), file.path());
        }
        return Ok(());
    }

    let mut sink = DirectorySink::new(&cli.out);
    for file in &files {
        sink.write(file)
            .with_context(|| format!("failed to write {}", file.path()))?;
        println!("{} {}", "wrote".green(), file.path());
    }
    summarize(&cli.out, &files);
    Ok(())
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level from `warn`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let settings = toml::from_str(&text).with_context(|| format!("invalid settings in {}", path.display()))?;
    debug!("loaded settings from {}", path.display());
    Ok(settings)
}

fn android(snapshot: Snapshot, settings: AndroidSettings) -> Result<Vec<OutputFile>> {
    let viewport = snapshot.viewport;
    let dom = snapshot.into_tree().context("snapshot has no document element")?;
    let (tree, files) = tessera_android::framework(settings)
        .run(&dom, viewport)
        .context("layout failed")?;
    info!("laid out {} nodes", tree.ids().count());
    Ok(files)
}

fn chrome(snapshot: Snapshot, settings: ChromeSettings) -> Result<Vec<OutputFile>> {
    let mut bundler = ChromeBundler::new(settings);
    if let Some(url) = snapshot.url.as_deref() {
        bundler = bundler.with_base_url(url)?;
    }
    let dom = snapshot.into_tree().context("snapshot has no document element")?;
    let bundle = bundler.bundle(&dom)?;
    info!("{} referenced files to fetch", bundle.remote().count());
    bundle_files(&bundle)
}

/// The generated bundle entries plus the manifest describing all of them.
fn bundle_files(bundle: &Bundle) -> Result<Vec<OutputFile>> {
    let mut files: Vec<OutputFile> = bundle
        .assets
        .iter()
        .filter_map(|asset| {
            let content = asset.content.clone()?;
            Some(OutputFile::new(asset.pathname.clone(), asset.filename.clone(), content))
        })
        .collect();
    let manifest = bundle.manifest().context("failed to serialise asset manifest")?;
    files.push(OutputFile::new("", MANIFEST_FILENAME, manifest));
    Ok(files)
}

fn summarize(out: &Path, files: &[OutputFile]) {
    let bytes: usize = files.iter().map(|file| file.content.len()).sum();
    println!(
        "\n{} {} files ({bytes} bytes) in {}",
        "done:".bold(),
        files.len(),
        out.display()
    );
    let warnings = warning_count();
    if warnings > 0 {
        println!("{} {warnings} unsupported values were approximated", "note:".cyan());
    }
}
