use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use lexiclass::{BundleSource, BundleStore, Classifier};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to classify; read from stdin when omitted
    text: Option<String>,

    /// Directory holding bundle.json and its artifacts
    #[arg(short, long)]
    bundle: Option<PathBuf>,

    /// JSON description of a remote bundle to fetch into the local cache
    #[arg(short, long, conflicts_with = "bundle")]
    source: Option<PathBuf>,

    /// Force a fresh download of the bundle files
    #[arg(short, long, requires = "source")]
    fresh: bool,

    /// Refit the vocabulary on every request (legacy behavior)
    #[arg(long)]
    legacy_refit: bool,
}

async fn resolve_bundle(args: &Args) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &args.bundle {
        return Ok(dir.clone());
    }
    let Some(source_path) = &args.source else {
        bail!("either --bundle or --source must be given");
    };

    let source = BundleSource::from_json_file(source_path)
        .with_context(|| format!("reading bundle source {:?}", source_path))?;
    let store = BundleStore::new_default()?;

    if args.fresh {
        info!("Fresh download requested - removing any existing bundle files...");
        store.remove_download(&source)?;
    }

    Ok(store.ensure_bundle_downloaded(&source).await?)
}

fn read_input(text: Option<String>) -> anyhow::Result<Vec<u8>> {
    if let Some(text) = text {
        return Ok(text.into_bytes());
    }
    let mut bytes = Vec::new();
    std::io::stdin().read_to_end(&mut bytes).context("reading stdin")?;
    while bytes.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
        bytes.pop();
    }
    Ok(bytes)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lexiclass::init_logger();
    let args = Args::parse();

    let start_time = Instant::now();
    let bundle_dir = resolve_bundle(&args).await?;

    let classifier = Classifier::builder()
        .with_bundle(&bundle_dir)
        .with_context(|| format!("loading bundle from {:?}", bundle_dir))?
        .with_legacy_refit(args.legacy_refit)
        .build()?;
    info!("Classifier built in {:.2?}: {:?}", start_time.elapsed(), classifier.info());

    let input = read_input(args.text)?;
    let classify_start = Instant::now();
    match classifier.classify_bytes(&input) {
        Ok(label) => {
            println!("Predicted class: {}", label);
            info!("Classification time: {:.2?}", classify_start.elapsed());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error processing text: {}", e);
            Err(e.into())
        }
    }
}
