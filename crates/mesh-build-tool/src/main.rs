use clap::{Parser, Subcommand};
use mesh_build_tool::AssetError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mesh-prep")]
#[command(about = "Compresses OBJ meshes into streamable GPU pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an OBJ mesh into a page blob + manifest
    Mesh {
        /// Input OBJ file
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Fractional bits of the position grid (step is 2^-precision)
        #[arg(long, default_value = "4")]
        position_precision: i32,
    },
}

fn main() -> Result<(), AssetError> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Mesh {
            input,
            output,
            position_precision,
        } => {
            log::info!("Converting mesh: {}", input.display());
            let built = mesh_build_tool::convert_mesh(&input, &output, position_precision)?;
            log::info!(
                "  {} vertices -> {} clusters in {} pages ({} bytes)",
                built.resources.num_input_vertices,
                built.resources.num_clusters,
                built.resources.num_root_pages,
                built.resources.root_data.len()
            );
            Ok(())
        }
    }
}
