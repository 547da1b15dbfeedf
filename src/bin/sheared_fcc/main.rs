use clap::Parser;
use nalgebra::{Matrix3, Matrix3xX, Vector3};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unshear::{
    constants::TIMESTEP_KEY,
    frame::{Frame, InfoValue},
    simulation_box::SimulationBox,
    writers::dump_traj::DumpTraj,
};

/// Writes an FCC crystal under steady simple shear as a LAMMPS dump,
/// flipping the xz tilt from +lx/2 to -lx/2 the way LAMMPS does.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// FCC lattice constant
    #[arg(short, long, default_value_t = 5.41)]
    lattice: f64,

    /// Unit cells along each axis
    #[arg(short, long, default_value_t = 5)]
    cells: usize,

    /// Number of frames
    #[arg(short, long, default_value_t = 50)]
    frames: usize,

    /// Growth of the xz tilt per frame
    #[arg(short, long, default_value_t = 1.0)]
    rate: f64,

    /// Standard deviation of the thermal displacement
    #[arg(short, long, default_value_t = 0.05)]
    noise: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, default_value_t = String::from("sheared.lammpstrj"))]
    outfile: String,
}

fn fcc_basis_frac() -> Matrix3xX<f64> {
    let a1: Vector3<f64> = Vector3::new(0.0, 0.0, 0.0);
    let a2: Vector3<f64> = Vector3::new(0.0, 0.5, 0.5);
    let a3: Vector3<f64> = Vector3::new(0.5, 0.0, 0.5);
    let a4: Vector3<f64> = Vector3::new(0.5, 0.5, 0.0);

    Matrix3xX::from_columns(&[a1, a2, a3, a4])
}

/// Fractional coordinates of an `n x n x n` FCC supercell.
fn supercell_frac(n: usize) -> Matrix3xX<f64> {
    let basis_frac = fcc_basis_frac();
    let mut sites = Vec::with_capacity(n * n * n * basis_frac.ncols());
    for ix in 0..n {
        for iy in 0..n {
            for iz in 0..n {
                let cell_origin_frac: Vector3<f64> = Vector3::new(ix as f64, iy as f64, iz as f64);
                for b in basis_frac.column_iter() {
                    sites.push((cell_origin_frac + b) / n as f64);
                }
            }
        }
    }
    Matrix3xX::from_columns(&sites)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let length = args.lattice * args.cells as f64;
    let sites = supercell_frac(args.cells);

    let mut rng = rand::rngs::SmallRng::seed_from_u64(args.seed);
    let normal = Normal::new(0.0, args.noise)?;

    let mut writer = DumpTraj::create(&args.outfile)?;
    let mut tilt: f64 = 0.0;
    let mut flips = 0;

    for step in 0..args.frames {
        #[rustfmt::skip]
        let h = Matrix3::new(
            length, 0.0, tilt,
            0.0, length, 0.0,
            0.0, 0.0, length,
        );
        let sim_box = SimulationBox::new(h, [true; 3])?;
        let mut positions = sim_box.cartesian(&sites);
        positions.apply(|x| *x += normal.sample(&mut rng));

        let mut frame = Frame::new(sim_box, positions);
        frame.wrap();
        frame.info.insert(TIMESTEP_KEY.to_string(), InfoValue::Int(step as i64));
        writer.write_step(&frame, step as i64)?;

        tilt += args.rate;
        if tilt > length / 2.0 {
            tilt -= length;
            flips += 1;
        }
    }
    writer.flush()?;

    tracing::info!(
        "wrote {} frames of {} atoms to {} with {} cell flips",
        args.frames,
        sites.ncols(),
        args.outfile,
        flips
    );
    Ok(())
}
