//! Host-level probes.

pub mod disk;
