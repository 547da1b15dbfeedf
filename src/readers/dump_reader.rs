use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use na::{Matrix3xX, Vector3};

use crate::{
    constants::{ORIGIN_KEY, TIMESTEP_KEY},
    errors::{Result, UnshearError},
    extensions::ArgsExt,
    frame::{Frame, InfoValue},
    simulation_box::SimulationBox,
};

/// Upper bound on the atom storage reserved from a `NUMBER OF ATOMS` header
/// before any atom line has been read.
const MAX_RESERVED_ATOMS: usize = 1 << 20;

/// Reader for LAMMPS text dumps (`dump atom`/`dump custom`).
///
/// Positions are stored relative to the box origin `(xlo, ylo, zlo)`, which
/// is kept in the frame metadata under `origin`.
pub struct DumpReader<R: BufRead> {
    reader: R,
    path: String,
    line: usize,
}

/// Column layout of an `ITEM: ATOMS` section.
struct AtomColumns {
    id: Option<usize>,
    type_id: Option<usize>,
    coords: [usize; 3],
    scaled: bool,
}

impl AtomColumns {
    fn from_header(columns: &[&str], line: usize) -> Result<Self> {
        let find = |name: &str| columns.iter().position(|c| *c == name);
        let id = find("id");
        let type_id = find("type");

        for (names, scaled) in [(["x", "y", "z"], false), (["xu", "yu", "zu"], false), (["xs", "ys", "zs"], true)] {
            if let (Some(x), Some(y), Some(z)) = (find(names[0]), find(names[1]), find(names[2])) {
                return Ok(Self {
                    id,
                    type_id,
                    coords: [x, y, z],
                    scaled,
                });
            }
        }
        Err(UnshearError::MalformedDump {
            line,
            reason: format!("no coordinate columns in ATOMS header '{}'", columns.join(" ")),
        })
    }
}

impl DumpReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().display().to_string();
        let file = File::open(&path).map_err(|e| UnshearError::InputFileError {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self::with_name(BufReader::new(file), path))
    }
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_name(reader, String::from("<stream>"))
    }

    fn with_name(reader: R, path: String) -> Self {
        Self {
            reader,
            path,
            line: 0,
        }
    }

    /// Next non-empty line, or `None` at the end of the input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.line += 1;
            let n = self
                .reader
                .read_line(&mut buf)
                .map_err(|e| UnshearError::DataFileError {
                    path: self.path.clone(),
                    line: self.line,
                    source: e,
                })?;
            if n == 0 {
                return Ok(None);
            }
            if !buf.trim().is_empty() {
                return Ok(Some(buf.trim().to_string()));
            }
        }
    }

    fn require_line(&mut self) -> Result<String> {
        self.next_line()?.ok_or(UnshearError::MalformedDump {
            line: self.line,
            reason: String::from("unexpected end of file"),
        })
    }

    /// Checks that `line` is the header of item `name` and returns the words after it.
    fn item_args(&self, line: &str, name: &str) -> Result<Vec<String>> {
        let rest = line
            .strip_prefix("ITEM:")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix(name))
            .ok_or_else(|| UnshearError::MalformedDump {
                line: self.line,
                reason: format!("expected 'ITEM: {}', found '{}'", name, line),
            })?;
        Ok(rest.split_whitespace().map(String::from).collect())
    }

    /// Reads the next frame; returns `None` once the dump is exhausted.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let header = match self.next_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        self.item_args(&header, "TIMESTEP")?;
        let line = self.require_line()?;
        let timestep = [line.as_str()].parse_int_at(0, self.line)?;

        let line = self.require_line()?;
        self.item_args(&line, "NUMBER OF ATOMS")?;
        let line = self.require_line()?;
        let n_atoms = [line.as_str()].parse_usize_at(0, self.line)?;

        let line = self.require_line()?;
        let box_args = self.item_args(&line, "BOX BOUNDS")?;
        let (sim_box, origin) = self.read_box(&box_args)?;

        let line = self.require_line()?;
        let columns = self.item_args(&line, "ATOMS")?;
        let columns: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
        let layout = AtomColumns::from_header(&columns, self.line)?;

        let mut atoms: Vec<(usize, usize, Vector3<f64>)> =
            Vec::with_capacity(n_atoms.min(MAX_RESERVED_ATOMS));
        for k in 0..n_atoms {
            let line = self.require_line()?;
            let split: Vec<&str> = line.split_whitespace().collect();
            let id = match layout.id {
                Some(col) => split.parse_usize_at(col, self.line)?,
                None => k + 1,
            };
            let type_id = match layout.type_id {
                Some(col) => split.parse_usize_at(col, self.line)?,
                None => 1,
            };
            let mut r = Vector3::zeros();
            for d in 0..3 {
                r[d] = split.parse_float_at(layout.coords[d], self.line)?;
            }
            let r = if layout.scaled {
                sim_box.h * r
            } else {
                r - origin
            };
            atoms.push((id, type_id, r));
        }
        atoms.sort_by_key(|(id, _, _)| *id);

        let positions = Matrix3xX::from_iterator(
            n_atoms,
            atoms.iter().flat_map(|(_, _, r)| r.iter().copied()),
        );
        let mut frame = Frame::new(sim_box, positions);
        frame.type_ids = atoms.iter().map(|(_, t, _)| *t).collect();
        frame
            .info
            .insert(TIMESTEP_KEY.to_string(), InfoValue::Int(timestep));
        frame
            .info
            .insert(ORIGIN_KEY.to_string(), InfoValue::Vector(origin));
        Ok(Some(frame))
    }

    /// Parses the three bound lines following `ITEM: BOX BOUNDS`.
    fn read_box(&mut self, args: &[String]) -> Result<(SimulationBox, Vector3<f64>)> {
        let triclinic = args.len() >= 3 && args[..3] == ["xy", "xz", "yz"];
        let flags = if triclinic { &args[3..] } else { args };
        let mut pbc = [true; 3];
        for (d, flag) in flags.iter().take(3).enumerate() {
            pbc[d] = flag == "pp";
        }

        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        let mut tilt = [0.0; 3];
        for d in 0..3 {
            let line = self.require_line()?;
            let split: Vec<&str> = line.split_whitespace().collect();
            lo[d] = split.parse_float_at(0, self.line)?;
            hi[d] = split.parse_float_at(1, self.line)?;
            if triclinic {
                tilt[d] = split.parse_float_at(2, self.line)?;
            }
        }

        // Triclinic dumps store the bounding box of the tilted cell.
        let [xy, xz, yz] = tilt;
        if triclinic {
            let xs = [0.0, xy, xz, xy + xz];
            lo[0] -= xs.iter().copied().fold(f64::INFINITY, f64::min);
            hi[0] -= xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            lo[1] -= yz.min(0.0);
            hi[1] -= yz.max(0.0);
        }

        let mut sim_box =
            SimulationBox::from_lammps_data(lo[0], hi[0], lo[1], hi[1], lo[2], hi[2], xy, xz, yz)?;
        sim_box.pbc = pbc;
        Ok((sim_box, Vector3::from(lo)))
    }

    /// Reads every remaining frame into memory.
    pub fn read_all(&mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_frame()? {
            frames.push(frame);
        }
        tracing::debug!("read {} frames from {}", frames.len(), self.path);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRICLINIC: &str = "\
ITEM: TIMESTEP
100
ITEM: NUMBER OF ATOMS
2
ITEM: BOX BOUNDS xy xz yz pp pp pp
-2.0 10.0 0.0
0.0 10.0 -2.0
0.0 10.0 0.0
ITEM: ATOMS id type x y z
2 1 5.0 5.0 5.0
1 2 1.0 1.0 1.0
";

    #[test]
    fn test_read_triclinic_frame() {
        let mut reader = DumpReader::new(TRICLINIC.as_bytes());
        let frame = reader.read_frame().unwrap().unwrap();

        assert_eq!(frame.n_atoms, 2);
        assert_eq!(frame.type_ids, vec![2, 1]);
        assert_eq!(frame.info.get(TIMESTEP_KEY), Some(&InfoValue::Int(100)));
        // xz = -2 widens the bounding box to the left only
        assert_relative_eq!(frame.sim_box.h[(0, 0)], 10.0, epsilon = 1e-12);
        assert_eq!(frame.sim_box.tilt_factors(), (0.0, -2.0, 0.0));
        assert_eq!(
            frame.info.get(ORIGIN_KEY),
            Some(&InfoValue::Vector(Vector3::new(0.0, 0.0, 0.0)))
        );
        assert_relative_eq!(frame.positions[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.positions[(0, 1)], 5.0, epsilon = 1e-12);
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_read_scaled_orthogonal_frames() {
        let dump = "\
ITEM: TIMESTEP
0
ITEM: NUMBER OF ATOMS
1
ITEM: BOX BOUNDS pp pp ff
1.0 5.0
0.0 2.0
0.0 3.0
ITEM: ATOMS id type xs ys zs
1 1 0.5 0.5 0.5

ITEM: TIMESTEP
10
ITEM: NUMBER OF ATOMS
1
ITEM: BOX BOUNDS pp pp ff
1.0 5.0
0.0 2.0
0.0 3.0
ITEM: ATOMS id type xs ys zs
1 1 0.25 0.5 0.5
";
        let frames = DumpReader::new(dump.as_bytes()).read_all().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].sim_box.pbc, [true, true, false]);
        assert!(frames[0].sim_box.is_orthogonal());
        assert_relative_eq!(frames[0].positions[(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(frames[1].positions[(0, 0)], 1.0, epsilon = 1e-12);
        assert_eq!(frames[1].info.get(TIMESTEP_KEY), Some(&InfoValue::Int(10)));
    }

    #[test]
    fn test_truncated_dump() {
        let truncated = &TRICLINIC[..TRICLINIC.len() - 16];
        let result = DumpReader::new(truncated.as_bytes()).read_all();
        assert!(matches!(result, Err(UnshearError::MalformedDump { .. })));
    }

    #[test]
    fn test_huge_atom_count_is_truncated_not_reserved() {
        let inflated = TRICLINIC.replace("ATOMS\n2\n", "ATOMS\n1000000000000000000\n");
        assert_ne!(inflated, TRICLINIC);
        let result = DumpReader::new(inflated.as_bytes()).read_frame();
        assert!(matches!(
            result,
            Err(UnshearError::MalformedDump { line: 12, .. })
        ));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let broken = TRICLINIC.replace("1 2 1.0 1.0 1.0", "1 2 1.0 one 1.0");
        match DumpReader::new(broken.as_bytes()).read_frame() {
            Err(UnshearError::FloatParseError { line, string, .. }) => {
                assert_eq!(line, 11);
                assert_eq!(string, "one");
            }
            other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unexpected_item() {
        let result = DumpReader::new("ITEM: ATOMS id x y z\n".as_bytes()).read_frame();
        assert!(matches!(result, Err(UnshearError::MalformedDump { line: 1, .. })));
    }
}
