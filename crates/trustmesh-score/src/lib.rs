//! # TrustMesh Score
//!
//! A deterministic, side-effect-free scoring function over a declaration
//! of six trust articles, with a pluggable weighting profile.

mod declaration;
mod profile;
mod scorer;

pub use declaration::{Articles, TrustDeclaration};
pub use profile::{EqualWeightProfile, ScoringProfile};
pub use scorer::{score, TrustScore};
