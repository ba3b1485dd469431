/// Heightmap to mesh command line entry point
use heightfield_mesh::config::load_params;
use heightfield_mesh::progress::{BarProgress, LogProgress, Progress};
use heightfield_mesh::report::{MeshReport, PipelineParams};
use heightfield_mesh::{
    DisplaceParams, DisplacementStrategy, Result, TileParams, apply_heightfield, generate_tile,
};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::{Level, debug, error};

#[derive(StructOpt, Debug)]
#[structopt(name = "heightfield-mesh")]
struct Opt {
    /// Increase log verbosity (-v debug, -vv trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Only log warnings and errors, no progress bar
    #[structopt(short, long)]
    quiet: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Build a tile mesh from a grayscale heightmap
    Generate(GenerateOpt),
    /// Displace a UV-mapped mesh along its face normals by a heightmap
    Displace(DisplaceOpt),
}

#[derive(StructOpt, Debug)]
struct GenerateOpt {
    /// Heightmap image
    #[structopt(parse(from_os_str))]
    heightmap: PathBuf,

    /// Output OBJ path
    #[structopt(parse(from_os_str))]
    output: PathBuf,

    /// JSON file with tile parameters; flags override its values
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(long)]
    tile_size: Option<f64>,

    #[structopt(long, allow_hyphen_values = true)]
    base_thickness: Option<f64>,

    #[structopt(long, allow_hyphen_values = true)]
    z_add: Option<f64>,

    #[structopt(long)]
    target_size: Option<f64>,

    /// Emit the top surface only, without base and walls
    #[structopt(long)]
    top_only: bool,

    /// Resample the heightmap to N x N before meshing
    #[structopt(long)]
    resolution: Option<u32>,

    /// Mesh the heightmap at its native resolution (wins over --resolution)
    #[structopt(long)]
    no_resample: bool,

    /// Rotation about X in degrees, applied after scaling
    #[structopt(long, allow_hyphen_values = true)]
    rotate_x: Option<f64>,

    /// Keep the tile in its generated Z-up orientation (wins over --rotate-x)
    #[structopt(long)]
    no_rotate: bool,

    /// Write a JSON run report to this path
    #[structopt(long, parse(from_os_str))]
    report: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
struct DisplaceOpt {
    /// UV-mapped OBJ mesh to displace
    #[structopt(parse(from_os_str))]
    mesh: PathBuf,

    /// Heightmap image sampled through the mesh UVs
    #[structopt(parse(from_os_str))]
    heightmap: PathBuf,

    /// Output OBJ path
    #[structopt(parse(from_os_str))]
    output: PathBuf,

    /// JSON file with displacement parameters; flags override its values
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Displacement distance for a full-white sample
    #[structopt(long, allow_hyphen_values = true)]
    scale: Option<f64>,

    /// How shared vertices combine face contributions: accumulate, last-write or average
    #[structopt(long)]
    strategy: Option<DisplacementStrategy>,

    /// Write a JSON run report to this path
    #[structopt(long, parse(from_os_str))]
    report: Option<PathBuf>,
}

impl GenerateOpt {
    fn params(&self) -> Result<TileParams> {
        let mut params: TileParams = match &self.config {
            Some(path) => load_params(path)?,
            None => TileParams::default(),
        };

        if let Some(tile_size) = self.tile_size {
            params.tile_size = tile_size;
        }
        if let Some(base_thickness) = self.base_thickness {
            params.base_thickness = base_thickness;
        }
        if let Some(z_add) = self.z_add {
            params.z_add = z_add;
        }
        if let Some(target_size) = self.target_size {
            params.target_size = target_size;
        }
        if self.top_only {
            params.full_field = false;
        }
        if self.no_resample {
            params.resolution = None;
        } else if self.resolution.is_some() {
            params.resolution = self.resolution;
        }
        if self.no_rotate {
            params.rotate_x_degrees = None;
        } else if self.rotate_x.is_some() {
            params.rotate_x_degrees = self.rotate_x;
        }

        Ok(params)
    }
}

impl DisplaceOpt {
    fn params(&self) -> Result<DisplaceParams> {
        let mut params: DisplaceParams = match &self.config {
            Some(path) => load_params(path)?,
            None => DisplaceParams::default(),
        };

        if let Some(scale) = self.scale {
            params.displacement_scale = scale;
        }
        if let Some(strategy) = self.strategy {
            params.strategy = strategy;
        }

        Ok(params)
    }
}

fn main() {
    let opt = Opt::from_args();

    let level = match (opt.quiet, opt.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install logger: {}", e);
    }

    let progress: Box<dyn Progress> = if opt.quiet {
        Box::new(LogProgress)
    } else {
        Box::new(BarProgress::new())
    };

    if let Err(e) = run(opt.command, progress.as_ref()) {
        error!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, progress: &dyn Progress) -> Result<()> {
    match command {
        Command::Generate(opt) => {
            let params = opt.params()?;
            debug!("Tile parameters: {:?}", params);

            let mesh = generate_tile(&opt.heightmap, &opt.output, &params, progress)?;

            if let Some(report_path) = &opt.report {
                MeshReport::new(
                    vec![opt.heightmap.clone()],
                    &opt.output,
                    &mesh,
                    PipelineParams::Generate(params),
                )
                .write(report_path)?;
            }
        }
        Command::Displace(opt) => {
            let params = opt.params()?;
            debug!("Displacement parameters: {:?}", params);

            let mesh =
                apply_heightfield(&opt.mesh, &opt.heightmap, &opt.output, &params, progress)?;

            if let Some(report_path) = &opt.report {
                MeshReport::new(
                    vec![opt.mesh.clone(), opt.heightmap.clone()],
                    &opt.output,
                    &mesh,
                    PipelineParams::Displace(params),
                )
                .write(report_path)?;
            }
        }
    }

    Ok(())
}
