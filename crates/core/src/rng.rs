//! RNG module - piece sources
//!
//! Pieces are drawn independently and uniformly over the seven kinds; there is
//! no bag and no history. [`SimpleRng`] is a small deterministic LCG so a seed
//! fully reproduces a game. [`ScriptedPieces`] replays a fixed list for tests
//! and puzzle setups.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max) from the high bits.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Where the session gets the next kind from. Called once per spawn.
pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

/// Independent uniform draws over all seven kinds.
#[derive(Debug, Clone)]
pub struct UniformPieces {
    rng: SimpleRng,
    seed: u32,
}

impl UniformPieces {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            seed,
        }
    }

    /// Seed this source was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl PieceSource for UniformPieces {
    fn next_kind(&mut self) -> PieceKind {
        let idx = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[idx]
    }
}

impl Default for UniformPieces {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Cycles through a fixed list of kinds.
#[derive(Debug, Clone)]
pub struct ScriptedPieces {
    kinds: Vec<PieceKind>,
    cursor: usize,
}

impl ScriptedPieces {
    /// An empty list falls back to `I` forever.
    pub fn new(kinds: &[PieceKind]) -> Self {
        let kinds = if kinds.is_empty() {
            vec![PieceKind::I]
        } else {
            kinds.to_vec()
        };
        Self { kinds, cursor: 0 }
    }
}

impl PieceSource for ScriptedPieces {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.cursor % self.kinds.len()];
        self.cursor = self.cursor.wrapping_add(1);
        kind
    }
}

impl<S: PieceSource + ?Sized> PieceSource for Box<S> {
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}
