//! Attestation and crosslink statistics computed once per epoch.
//!
//! [`epoch_variables`] is the entry point. The other modules expose the steps it is built from.

pub use crate::{
    classification::AttestationBucket,
    crosslinks::CrosslinkWinner,
    epoch_variables::{epoch_variables, EpochVariables},
};

use types::nonstandard::ErrorKind;

pub mod classification;
pub mod crosslinks;

mod epoch_variables;

#[cfg(test)]
mod test_utils;

/// Classifies an error returned by this crate or the crates it builds on.
///
/// Returns `None` for errors that carry no classification.
#[must_use]
pub fn error_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(error) = error.downcast_ref::<helper_functions::error::Error>() {
        return Some(error.kind());
    }

    error
        .downcast_ref::<types::config::Error>()
        .map(types::config::Error::kind)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn error_kind_of_unclassified_error() {
        assert_eq!(error_kind(&anyhow!("unrelated")), None);
    }

    #[test]
    fn error_kind_survives_context() {
        let error = anyhow::Error::new(helper_functions::error::Error::BalanceOverflow)
            .context("while computing epoch variables");

        assert_eq!(error_kind(&error), Some(ErrorKind::InvariantViolation));
    }
}
