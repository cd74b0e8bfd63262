use types::{containers::Validator, primitives::Epoch};

#[must_use]
pub const fn is_active_validator(validator: &Validator, epoch: Epoch) -> bool {
    validator.activation_epoch <= epoch && epoch < validator.exit_epoch
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use types::consts::FAR_FUTURE_EPOCH;

    use super::*;

    #[test_case(0, FAR_FUTURE_EPOCH, 0 => true; "active since genesis")]
    #[test_case(3, FAR_FUTURE_EPOCH, 2 => false; "not yet activated")]
    #[test_case(3, FAR_FUTURE_EPOCH, 3 => true; "activated in this epoch")]
    #[test_case(0, 5, 4 => true; "exiting in next epoch")]
    #[test_case(0, 5, 5 => false; "exited in this epoch")]
    fn is_active_validator_at(activation_epoch: Epoch, exit_epoch: Epoch, epoch: Epoch) -> bool {
        let validator = Validator {
            activation_epoch,
            exit_epoch,
            ..Validator::default()
        };

        is_active_validator(&validator, epoch)
    }
}
