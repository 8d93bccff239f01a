//! The genome value type and its arena handle.
//!
//! A [`Genome`] is an immutable, fixed-length gene sequence. Two genomes
//! are the same genotype iff every gene matches. Genomes are totally
//! ordered lexicographically, which the statistics core uses as the
//! deterministic tie-break between equally common genotypes.
//!
//! [`GenomeId`] is the stable handle a genome registry hands out, so
//! population maps can key on a small `Copy` value instead of hashing the
//! full gene sequence on every lookup.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of genes in a genome when nothing else is configured.
pub const DEFAULT_GENOME_LENGTH: usize = 32;

/// An immutable gene sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Genome {
    genes: Vec<u8>,
}

impl Genome {
    /// Create a genome from its genes.
    pub const fn new(genes: Vec<u8>) -> Self {
        Self { genes }
    }

    /// Create an all-zero genome of the given length.
    ///
    /// Used as the "no dominant genotype yet" sentinel.
    pub fn zeroed(length: usize) -> Self {
        Self {
            genes: vec![0; length],
        }
    }

    /// Return the genes in order.
    pub fn genes(&self) -> &[u8] {
        &self.genes
    }

    /// Return the number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the genome has no genes at all.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Return the human-readable genotype string shown by renderers.
    pub fn display_string(&self) -> String {
        self.to_string()
    }
}

impl From<Vec<u8>> for Genome {
    fn from(genes: Vec<u8>) -> Self {
        Self::new(genes)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for gene in &self.genes {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{gene}")?;
            first = false;
        }
        Ok(())
    }
}

/// Stable handle to a genome stored in a registry.
///
/// Handles are only meaningful for the registry that issued them. A
/// registry may reuse a handle after the genome it pointed to is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenomeId(u32);

impl GenomeId {
    /// Wrap a raw slot index.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the raw slot index.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GenomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "genome#{}", self.0)
    }
}
