use std::{
    fs::File,
    io::{BufWriter, Error, ErrorKind, Result, Write},
    path::Path,
};

use na::Vector3;

use crate::{
    constants::ORIGIN_KEY,
    frame::{Frame, InfoValue},
    simulation_box::SimulationBox,
};

/// Writer for LAMMPS text dumps.
pub struct DumpTraj<W: Write> {
    out: W,
}

impl DumpTraj<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(DumpTraj {
            out: BufWriter::new(file),
        })
    }
}

fn boundary_flags(sim_box: &SimulationBox) -> String {
    sim_box
        .pbc
        .iter()
        .map(|&p| if p { "pp" } else { "ff" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn origin_of(frame: &Frame) -> Vector3<f64> {
    frame
        .info
        .get(ORIGIN_KEY)
        .and_then(InfoValue::as_vector)
        .copied()
        .unwrap_or_else(Vector3::zeros)
}

impl<W: Write> DumpTraj<W> {
    pub fn new(out: W) -> Self {
        DumpTraj { out }
    }

    pub fn write_timestep(&mut self, step: i64) -> Result<()> {
        writeln!(self.out, "ITEM: TIMESTEP")?;
        writeln!(self.out, "{}", step)?;
        Ok(())
    }

    pub fn write_natoms(&mut self, n_atoms: usize) -> Result<()> {
        writeln!(self.out, "ITEM: NUMBER OF ATOMS")?;
        writeln!(self.out, "{}", n_atoms)?;
        Ok(())
    }

    pub fn write_bounds(&mut self, sim_box: &SimulationBox, origin: &Vector3<f64>) -> Result<()> {
        let h = &sim_box.h;
        if h[(1, 0)] != 0.0 || h[(2, 0)] != 0.0 || h[(2, 1)] != 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "cell is not in the upper-triangular LAMMPS form",
            ));
        }
        let hi = origin + sim_box.diagonal();

        if sim_box.is_orthogonal() {
            writeln!(self.out, "ITEM: BOX BOUNDS {}", boundary_flags(sim_box))?;
            for d in 0..3 {
                writeln!(self.out, "{} {}", origin[d], hi[d])?;
            }
            return Ok(());
        }

        // Triclinic bounds are those of the bounding box of the tilted cell.
        let (xy, xz, yz) = sim_box.tilt_factors();
        let xs = [0.0, xy, xz, xy + xz];
        let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        writeln!(self.out, "ITEM: BOX BOUNDS xy xz yz {}", boundary_flags(sim_box))?;
        writeln!(self.out, "{} {} {}", origin[0] + x_min, hi[0] + x_max, xy)?;
        writeln!(self.out, "{} {} {}", origin[1] + yz.min(0.0), hi[1] + yz.max(0.0), xz)?;
        writeln!(self.out, "{} {} {}", origin[2], hi[2], yz)?;
        Ok(())
    }

    pub fn write_atoms_info(&mut self, frame: &Frame, origin: &Vector3<f64>) -> Result<()> {
        writeln!(self.out, "ITEM: ATOMS id type x y z")?;
        for i in 0..frame.n_atoms {
            let position = frame.positions.column(i) + origin;
            writeln!(
                self.out,
                "{} {} {} {} {}",
                i + 1,
                frame.type_ids.get(i).copied().unwrap_or(1),
                position[0],
                position[1],
                position[2]
            )?;
        }
        Ok(())
    }

    pub fn write_step(&mut self, frame: &Frame, step: i64) -> Result<()> {
        let origin = origin_of(frame);
        self.write_timestep(step)?;
        self.write_natoms(frame.n_atoms)?;
        self.write_bounds(&frame.sim_box, &origin)?;
        self.write_atoms_info(frame, &origin)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::dump_reader::DumpReader;
    use approx::assert_relative_eq;
    use na::{Matrix3, Matrix3xX};

    #[test]
    fn test_orthogonal_header() {
        let sim_box = SimulationBox::orthogonal(Vector3::new(4.0, 5.0, 6.0), [true, true, false])
            .unwrap();
        let mut writer = DumpTraj::new(Vec::new());
        writer
            .write_bounds(&sim_box, &Vector3::new(1.0, 0.0, 0.0))
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "ITEM: BOX BOUNDS pp pp ff\n1 5\n0 5\n0 6\n");
    }

    #[test]
    fn test_triclinic_frame_reads_back() {
        let h = Matrix3::new(10.0, 0.0, -3.0, 0.0, 8.0, 1.5, 0.0, 0.0, 6.0);
        let sim_box = SimulationBox::new(h, [true; 3]).unwrap();
        let positions = Matrix3xX::from_columns(&[
            Vector3::new(0.5, 1.0, 1.5),
            Vector3::new(-2.0, 7.0, 5.5),
        ]);
        let mut frame = Frame::new(sim_box, positions);
        frame.type_ids = vec![3, 1];
        frame
            .info
            .insert(ORIGIN_KEY.to_string(), InfoValue::Vector(Vector3::new(-1.0, 2.0, 0.0)));

        let mut writer = DumpTraj::new(Vec::new());
        writer.write_step(&frame, 42).unwrap();
        let bytes = writer.into_inner();

        let back = DumpReader::new(bytes.as_slice()).read_frame().unwrap().unwrap();
        assert_relative_eq!(back.sim_box.h, frame.sim_box.h, epsilon = 1e-12);
        assert_relative_eq!(back.positions, frame.positions, epsilon = 1e-12);
        assert_eq!(back.type_ids, frame.type_ids);
        assert_eq!(back.info.get(ORIGIN_KEY), frame.info.get(ORIGIN_KEY));
    }

    #[test]
    fn test_lower_triangular_cell_is_rejected() {
        let h = Matrix3::new(10.0, 0.0, 0.0, 1.0, 8.0, 0.0, 0.0, 0.0, 6.0);
        let frame = Frame::new(SimulationBox::new(h, [true; 3]).unwrap(), Matrix3xX::zeros(0));
        let mut writer = DumpTraj::new(Vec::new());
        let err = writer.write_step(&frame, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
