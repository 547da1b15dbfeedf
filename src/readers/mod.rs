//! Readers turning trajectory files into frames.
pub mod dump_reader;
