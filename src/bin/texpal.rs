use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use texture_palette_wasm::project::Project;
use texture_palette_wasm::texture::{Texture, TxsTexture, write_txs};
use texture_palette_wasm::{Palette, QuantizeOptions, quantize_textures};

/// Compute one shared palette for every texture of a project and pack them
/// into a `.txs` asset.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Project file listing the textures
    project: PathBuf,

    /// Refinement steps per attempt
    #[arg(long, default_value_t = 1000)]
    steps: usize,

    /// Independent k-means attempts
    #[arg(short, long, default_value_t = 10)]
    attempts: usize,

    /// Seed for reproducible palettes
    #[arg(short, long)]
    seed: Option<u64>,

    /// Brightness levels per color (overrides the project's #levels)
    #[arg(short, long)]
    levels: Option<usize>,

    /// Comma-separated list of hex colors to use as palette (skip k-means)
    #[arg(short = 'c', long)]
    palette: Option<String>,

    /// Where to save the palette
    #[arg(short, long, default_value = "palette.json")]
    palette_out: PathBuf,

    /// Where to write the packed textures
    #[arg(short, long, default_value = "result.txs")]
    output: PathBuf,

    /// Directory for PNG previews of the indexed textures
    #[arg(long)]
    preview_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let project = Project::open(&args.project)
        .with_context(|| format!("cannot open project {}", args.project.display()))?;

    let mut textures = Vec::with_capacity(project.textures.len());
    for entry in &project.textures {
        info!("Loading \"{}\" as \"{}\" ...", entry.path.display(), entry.name);
        let texture = Texture::load(&entry.name, &entry.path)
            .with_context(|| format!("cannot load {}", entry.path.display()))?;
        textures.push(texture);
    }

    let mut palette = match &args.palette {
        Some(list) => Palette::from_hex_list(list).context("invalid --palette")?,
        None => {
            info!("Calculating palette...");
            let mut options = QuantizeOptions::new()
                .colors(project.colors)
                .levels(args.levels.unwrap_or(project.levels))
                .max_steps(args.steps)
                .max_attempts(args.attempts);
            if let Some(seed) = args.seed {
                options = options.seed(seed);
            }

            let result = quantize_textures(textures.iter().map(|t| &t.pixels), &options)
                .context("palette calculation failed")?;
            info!("Attempt errors: {:?}", result.attempt_errors());
            result.into_palette()
        }
    };
    palette
        .save(&args.palette_out)
        .with_context(|| format!("cannot save palette to {}", args.palette_out.display()))?;

    info!("Saving file...");
    let mut entries = Vec::with_capacity(textures.len());
    for (texture, entry) in textures.iter().zip(&project.textures) {
        let indexed = texture.index(&palette);
        if let Some(dir) = &args.preview_dir {
            fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}.png", texture.name));
            indexed
                .preview(&palette)
                .save(&path)
                .with_context(|| format!("cannot write preview {}", path.display()))?;
        }
        let txs = TxsTexture::new(&indexed, project.offset, entry.transparent_at)
            .with_context(|| format!("cannot pack \"{}\"", texture.name))?;
        entries.push(txs);
    }

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    write_txs(BufWriter::new(file), &palette, project.offset, &entries)?;
    println!("Saved → {}", args.output.display());

    Ok(())
}
