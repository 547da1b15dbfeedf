/// Absolute tolerance below which an off-diagonal cell entry counts as zero.
pub const TRIANGULAR_TOLERANCE: f64 = 1e-12;

/// Metadata key of an externally tracked (Lees-Edwards) shear offset `(dx, dy, dz)`.
pub const SHEAR_DX_KEY: &str = "shear_dx";

/// Metadata key under which the sheared cell of a corrected frame is recorded.
pub const TRUE_CELL_KEY: &str = "true_cell";

/// Metadata key holding the MD timestep a frame was dumped at.
pub const TIMESTEP_KEY: &str = "timestep";

/// Metadata key holding the lower corner `(xlo, ylo, zlo)` of a dumped box.
pub const ORIGIN_KEY: &str = "origin";
