//! Candidate asset names
//!
//! Release publishers name their binaries slightly differently, so instead of
//! looking assets up in a compatibility table we guess an ordered list of
//! plausible file names and try them one by one.

mod candidate;

pub use candidate::{Candidate, candidates, with_override};
