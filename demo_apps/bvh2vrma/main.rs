use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use vrma::animation::TargetPath;
use vrma::assets::{BvhLoader, VrmaLoader};
use vrma::humanoid::{HumanBoneName, classify};
use vrma::{ConvertOptions, HumanoidRoleMap, Skeleton, convert};

#[derive(Parser, Debug)]
#[command(name = "bvh2vrma", version, about = "Convert BVH motion capture into VRM Animation")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a .bvh file into a .vrma file
    Convert {
        input: PathBuf,
        /// Output path (defaults to the input with a .vrma extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON file with conversion options
        #[arg(long)]
        config: Option<PathBuf>,
        /// Uniform scale applied to the skeleton
        #[arg(long)]
        scale: Option<f32>,
        /// Keep the hips rest offset in the hips translation track
        #[arg(long)]
        keep_root_offset: bool,
    },
    /// Print the humanoid table and track counts of a .vrma file
    Inspect { path: PathBuf },
    /// Print the humanoid classification of a .bvh file
    Classify { input: PathBuf },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert {
            input,
            output,
            config,
            scale,
            keep_root_offset,
        } => {
            let mut options = match config {
                Some(path) => ConvertOptions::from_json_file(&path)
                    .with_context(|| format!("Failed to read options from {}", path.display()))?,
                None => ConvertOptions::default(),
            };
            if let Some(scale) = scale {
                options.retarget.scale = scale;
            }
            if keep_root_offset {
                options.retarget.remove_root_offset = false;
            }

            let output = output.unwrap_or_else(|| input.with_extension("vrma"));
            convert_file(&input, &output, &options)?;
        }
        Command::Inspect { path } => inspect(&path)?,
        Command::Classify { input } => classify_file(&input)?,
    }
    Ok(())
}

fn require_bvh(path: &Path) -> Result<()> {
    let is_bvh = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bvh"));
    if !is_bvh {
        bail!("{} is not a .bvh file", path.display());
    }
    Ok(())
}

fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<()> {
    require_bvh(input)?;

    let data = BvhLoader::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
    let conversion = convert(&data.skeleton, &data.clip, options)
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    let bytes = conversion.to_vrma().context("Failed to encode VRMA")?;

    fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Wrote {} ({} bytes, {} humanoid bones, {} tracks, {} warnings)",
        output.display(),
        bytes.len(),
        conversion.roles.len(),
        conversion.output.clip.tracks.len(),
        conversion.warnings.len()
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let document = VrmaLoader::load(path).with_context(|| format!("Failed to load {}", path.display()))?;

    println!("{}", path.display());
    println!(
        "  specVersion: {}",
        document.spec_version.as_deref().unwrap_or("<none>")
    );
    let scene_root = document.skeleton.scene_root().and_then(|key| document.skeleton.name_of(key));
    println!(
        "  bones: {} (scene root: {})",
        document.skeleton.len(),
        scene_root.unwrap_or("<none>")
    );
    println!(
        "  clip '{}': {:.3}s, {} rotation / {} translation tracks",
        document.clip.name,
        document.clip.duration,
        document.clip.count_tracks(TargetPath::Rotation),
        document.clip.count_tracks(TargetPath::Translation)
    );
    println!("  humanBones:");
    for (role, name) in &document.human_bones {
        println!("    {role:<16} {name}");
    }
    Ok(())
}

fn classify_file(input: &Path) -> Result<()> {
    require_bvh(input)?;

    let mut data = BvhLoader::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
    data.skeleton.update_world_matrices();
    let root = data.skeleton.find_root()?;
    let classification = classify(&data.skeleton, root)?;

    print_roles(&data.skeleton, &classification.roles);
    for warning in &classification.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}

fn print_roles(skeleton: &Skeleton, roles: &HumanoidRoleMap) {
    println!("{} ({} bones)", skeleton.name, skeleton.len());
    for role in HumanBoneName::ALL {
        let name = roles.get(role).and_then(|key| skeleton.name_of(key));
        match name {
            Some(name) => println!("  {role:<16} {name}"),
            None if role.is_required() => println!("  {role:<16} <missing>"),
            None => {}
        }
    }
}
