use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use gltf_importer::{load_glb_with_options, load_gltf_with_options, LoadOptions, Model};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let load_options = if options.skip_bad_payloads {
        LoadOptions::skip_bad_payloads()
    } else {
        LoadOptions::default()
    };

    let model = if is_binary(&options.path) {
        load_glb_with_options(&options.path, &load_options)
    } else {
        let root = options
            .root
            .clone()
            .unwrap_or_else(|| options.path.parent().map(Path::to_path_buf).unwrap_or_default());
        load_gltf_with_options(root, &options.path, &load_options)
    }
    .with_context(|| format!("failed to load {}", options.path.display()))?;

    print_summary(&model);
    if options.json {
        let json = serde_json::to_string_pretty(&model).context("failed to serialize model")?;
        println!("{json}");
    }
    Ok(())
}

fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"))
}

fn print_summary(model: &Model) {
    println!(
        "Loaded model with {} nodes, {} meshes, {} materials, {} buffers, {} images",
        model.nodes.len(),
        model.meshes.len(),
        model.materials.len(),
        model.buffers.len(),
        model.images.len()
    );
    for (i, node) in model.nodes.iter().enumerate() {
        let name = node.name.clone().unwrap_or_else(|| format!("node {i}"));
        match node.mesh {
            Some(mesh) => println!(" - {name} (mesh {mesh})"),
            None => println!(" - {name}"),
        }
    }
    for (i, buffer) in model.buffers.iter().enumerate() {
        println!(
            " buffer {i}: {} of {} bytes resolved",
            buffer.data.len(),
            buffer.byte_length
        );
    }
}

struct CliOptions {
    path: PathBuf,
    root: Option<PathBuf>,
    skip_bad_payloads: bool,
    json: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let usage = "Usage: gltf-importer <model.gltf|model.glb> [--root <dir>] [--skip-bad-payloads] [--json]";
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(usage));
        };
        let mut root = None;
        let mut skip_bad_payloads = false;
        let mut json = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--root" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| anyhow!("--root expects a directory. {usage}"))?;
                    root = Some(PathBuf::from(dir));
                }
                "--skip-bad-payloads" => skip_bad_payloads = true,
                "--json" => json = true,
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {usage}"));
                }
            }
        }
        Ok(Self {
            path: PathBuf::from(path),
            root,
            skip_bad_payloads,
            json,
        })
    }
}
