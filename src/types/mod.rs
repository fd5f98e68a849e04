pub mod candidate;
pub mod identifiers;
pub mod selection_result;

pub use candidate::{Candidate, NormalizedCandidate, PreparedCandidates, RawFeatures};
pub use identifiers::{CandidateId, SetVersion};
pub use selection_result::{GlobalDistribution, SelectionResult};
