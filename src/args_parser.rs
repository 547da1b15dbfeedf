use clap::Parser;

/// Removes simple shear and cell flips from a LAMMPS dump trajectory.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// LAMMPS text dump of the sheared run
    #[arg(short, long)]
    pub infile: String,

    /// Dump receiving the frames in their rectangular cells
    #[arg(short, long, default_value_t = String::from("unsheared.lammpstrj"))]
    pub outfile: String,

    /// Write only every n-th frame
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub stride: u64,
}
