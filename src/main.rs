mod args_parser;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unshear::{
    constants::TIMESTEP_KEY,
    deformation::RemoveSimpleShear,
    frame::InfoValue,
    readers::dump_reader::DumpReader,
    writers::dump_traj::DumpTraj,
};

use crate::args_parser::Args;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let frames = DumpReader::open(&args.infile)?.read_all()?;
    tracing::info!("read {} frames from {}", frames.len(), args.infile);

    let mut writer = DumpTraj::create(&args.outfile)
        .with_context(|| format!("Failed to create output file '{}'", args.outfile))?;
    let mut view = RemoveSimpleShear::new(frames);

    let stride = args.stride as usize;
    for i in (0..view.len()).step_by(stride) {
        let frame = view.get(i as isize)?;
        let step = frame
            .info
            .get(TIMESTEP_KEY)
            .and_then(InfoValue::as_int)
            .unwrap_or(i as i64);
        writer
            .write_step(frame, step)
            .with_context(|| format!("Failed to write frame {} to '{}'", i, args.outfile))?;
    }
    writer.flush()?;

    if let Some(last) = view.cache().states().last() {
        tracing::info!(
            "wrote {} frames to {}, cumulative shear ({}, {})",
            view.len().div_ceil(stride),
            args.outfile,
            last.shear.0,
            last.shear.1
        );
    }
    Ok(())
}
