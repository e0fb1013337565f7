//! The normalization pipeline: raw sales rows in, deduplicated `NormalizedTransaction`s out.

mod aliases;
mod dedupe;
mod normalize;

pub use aliases::{AliasRule, AliasRules};
pub use dedupe::dedupe;
pub use normalize::{Normalized, Normalizer, RejectReason, Rejection};
