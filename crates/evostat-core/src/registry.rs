//! Genome arena.
//!
//! The [`GenomeRegistry`] owns every distinct live genome exactly once and
//! hands out [`GenomeId`] handles. Population counts and the dominant
//! genotype refer to genomes through these handles, so the full gene
//! sequence is hashed once per birth or death lookup and never copied
//! into secondary structures.
//!
//! Slots are released when a genotype dies out and reused by later
//! interns, which keeps memory bounded by the number of genotypes alive at
//! the same time rather than the number ever seen.

use std::collections::HashMap;
use std::sync::Arc;

use evostat_types::{Genome, GenomeId};

/// Errors raised by the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Every `u32` slot index is in use.
    #[error("genome registry exhausted: more than u32::MAX live genotypes")]
    Exhausted,
}

/// Arena of genomes addressed by [`GenomeId`].
#[derive(Debug, Default)]
pub struct GenomeRegistry {
    /// Slot storage; `None` marks a released slot.
    slots: Vec<Option<Arc<Genome>>>,
    /// Reverse index from genome value to its slot.
    index: HashMap<Arc<Genome>, GenomeId>,
    /// Released slots available for reuse (LIFO).
    free: Vec<GenomeId>,
}

impl GenomeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `genome`, storing it if it is not present.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Exhausted`] if no slot index is left.
    pub fn intern(&mut self, genome: &Genome) -> Result<GenomeId, RegistryError> {
        if let Some(id) = self.index.get(genome) {
            return Ok(*id);
        }

        let stored = Arc::new(genome.clone());
        let id = if let Some(id) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(slot_index(id)) {
                *slot = Some(Arc::clone(&stored));
            }
            id
        } else {
            let raw = u32::try_from(self.slots.len()).map_err(|_err| RegistryError::Exhausted)?;
            self.slots.push(Some(Arc::clone(&stored)));
            GenomeId::from_raw(raw)
        };

        self.index.insert(stored, id);
        Ok(id)
    }

    /// Return the handle of an already stored genome.
    pub fn lookup(&self, genome: &Genome) -> Option<GenomeId> {
        self.index.get(genome).copied()
    }

    /// Return the genome behind a handle, if the slot is live.
    pub fn get(&self, id: GenomeId) -> Option<&Genome> {
        self.slots
            .get(slot_index(id))
            .and_then(Option::as_deref)
    }

    /// Release a slot so it can be reused. Returns the removed genome.
    pub fn release(&mut self, id: GenomeId) -> Option<Genome> {
        let stored = self.slots.get_mut(slot_index(id))?.take()?;
        self.index.remove(stored.as_ref());
        self.free.push(id);
        Some(Arc::unwrap_or_clone(stored))
    }

    /// Number of live genomes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no genome is stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Convert a handle to a `Vec` index.
///
/// `u32` always fits in `usize` on the 32- and 64-bit targets we build for.
const fn slot_index(id: GenomeId) -> usize {
    id.raw() as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn genome(genes: &[u8]) -> Genome {
        Genome::new(genes.to_vec())
    }

    #[test]
    fn intern_is_idempotent() {
        let mut registry = GenomeRegistry::new();
        let a = registry.intern(&genome(&[1, 2])).unwrap();
        let again = registry.intern(&genome(&[1, 2])).unwrap();
        let b = registry.intern(&genome(&[2, 1])).unwrap();
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_and_get_agree() {
        let mut registry = GenomeRegistry::new();
        let g = genome(&[3, 3, 3]);
        let id = registry.intern(&g).unwrap();
        assert_eq!(registry.lookup(&g), Some(id));
        assert_eq!(registry.get(id), Some(&g));
        assert_eq!(registry.lookup(&genome(&[0])), None);
    }

    #[test]
    fn released_slot_is_reused_without_aliasing() {
        let mut registry = GenomeRegistry::new();
        let a = registry.intern(&genome(&[1])).unwrap();
        let b = registry.intern(&genome(&[2])).unwrap();

        assert_eq!(registry.release(a), Some(genome(&[1])));
        assert_eq!(registry.get(a), None);
        assert_eq!(registry.lookup(&genome(&[1])), None);

        let c = registry.intern(&genome(&[3])).unwrap();
        assert_eq!(c, a, "freed slot should be reused");
        assert_eq!(registry.get(c), Some(&genome(&[3])));
        assert_eq!(registry.get(b), Some(&genome(&[2])));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn double_release_is_a_no_op() {
        let mut registry = GenomeRegistry::new();
        let a = registry.intern(&genome(&[9])).unwrap();
        assert!(registry.release(a).is_some());
        assert!(registry.release(a).is_none());
        assert!(registry.is_empty());
    }
}
