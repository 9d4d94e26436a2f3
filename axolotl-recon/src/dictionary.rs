//! External boundary for dictionary-learning backends.
//!
//! Learning and sparse coding are supplied by an external backend; this
//! crate only fixes the data layout and the two-operation contract so
//! that learned dictionaries can feed the operator algebra and solvers.

use axolotl::basics::Dense;
use axolotl::{Error, Result, Scalar, Shape};

/// A learned dictionary of `n_atoms` atoms of `patch_len` samples each.
///
/// Atom `k` occupies `atoms[k * patch_len .. (k + 1) * patch_len]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dictionary<S> {
    atoms: Vec<S>,
    patch_len: usize,
    n_atoms: usize,
}

impl<S: Scalar> Dictionary<S> {
    pub fn new(atoms: Vec<S>, patch_len: usize, n_atoms: usize) -> Result<Self> {
        if n_atoms == 0 || patch_len == 0 {
            return Err(Error::EmptyBlock {
                context: "Dictionary::new",
            });
        }
        if atoms.len() != patch_len * n_atoms {
            return Err(Error::ShapeMismatch {
                context: "Dictionary::new",
                lhs: Shape::from(atoms.len()),
                rhs: Shape::from([n_atoms, patch_len]),
            });
        }
        Ok(Dictionary {
            atoms,
            patch_len,
            n_atoms,
        })
    }

    pub fn patch_len(&self) -> usize {
        self.patch_len
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn atom(&self, k: usize) -> &[S] {
        &self.atoms[k * self.patch_len..(k + 1) * self.patch_len]
    }

    /// The synthesis operator mapping a code vector to a patch,
    /// `patch = D code`, as a dense map.
    pub fn synthesis_op(&self) -> Dense<S> {
        let mut data = vec![S::zero(); self.patch_len * self.n_atoms];
        for k in 0..self.n_atoms {
            let atom = self.atom(k);
            for (i, &v) in atom.iter().enumerate() {
                data[i * self.n_atoms + k] = v;
            }
        }
        Dense::new(self.patch_len, self.n_atoms, data)
            .expect("dictionary dimensions were validated at construction")
    }
}

/// Sparse codes for a batch of patches.
///
/// The code vector for patch `j` occupies
/// `codes[j * n_atoms .. (j + 1) * n_atoms]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseCodes<S> {
    codes: Vec<S>,
    n_atoms: usize,
    n_patches: usize,
}

impl<S: Scalar> SparseCodes<S> {
    pub fn new(codes: Vec<S>, n_atoms: usize, n_patches: usize) -> Result<Self> {
        if codes.len() != n_atoms * n_patches {
            return Err(Error::ShapeMismatch {
                context: "SparseCodes::new",
                lhs: Shape::from(codes.len()),
                rhs: Shape::from([n_patches, n_atoms]),
            });
        }
        Ok(SparseCodes {
            codes,
            n_atoms,
            n_patches,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn n_patches(&self) -> usize {
        self.n_patches
    }

    pub fn patch(&self, j: usize) -> &[S] {
        &self.codes[j * self.n_atoms..(j + 1) * self.n_atoms]
    }
}

/// Contract for an external dictionary-learning backend.
///
/// `patches` are laid out as consecutive `patch_len` slices. Backends
/// own their algorithm internals entirely; implementations must accept
/// any patch batch whose length is a multiple of the patch length and
/// may panic on layouts that violate that precondition.
pub trait DictionaryBackend<S: Scalar> {
    /// Learns a dictionary from training patches.
    fn fit(&mut self, patches: &[S], patch_len: usize) -> Dictionary<S>;

    /// Sparse-codes `patches` against a learned dictionary.
    fn encode(&self, patches: &[S], dictionary: &Dictionary<S>) -> SparseCodes<S>;
}
