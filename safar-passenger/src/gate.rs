use serde::Serialize;

/// Roster validity folded into the two booleans the checkout buttons depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    /// Roster non-empty and at least one passenger complete and error-free.
    pub is_any_passenger_valid: bool,
    /// Roster non-empty and every passenger complete and error-free.
    pub all_passengers_valid: bool,
}

impl GateStatus {
    /// Checkout proceeds on the lenient flag; the server adjudicates completeness.
    pub fn can_proceed(&self) -> bool {
        self.is_any_passenger_valid
    }
}

/// Read-through view over the roster; never writes seat or passenger state.
#[derive(Debug, Default)]
pub struct ValidationGate {
    last: GateStatus,
}

impl ValidationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(validity: impl IntoIterator<Item = bool>) -> GateStatus {
        let mut count = 0usize;
        let mut valid = 0usize;
        for ok in validity {
            count += 1;
            if ok {
                valid += 1;
            }
        }

        GateStatus {
            is_any_passenger_valid: valid > 0,
            all_passengers_valid: count > 0 && valid == count,
        }
    }

    /// Re-evaluate and remember the result. Returns true when either flag flipped.
    pub fn refresh(&mut self, validity: impl IntoIterator<Item = bool>) -> bool {
        let next = Self::evaluate(validity);
        let changed = next != self.last;
        self.last = next;
        changed
    }

    pub fn status(&self) -> GateStatus {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_roster_blocks_both() {
        assert_eq!(ValidationGate::evaluate(Vec::<bool>::new()), GateStatus::default());
    }

    #[test]
    fn test_lenient_and_strict_flags() {
        let mixed = ValidationGate::evaluate([true, false, false]);
        assert!(mixed.is_any_passenger_valid);
        assert!(!mixed.all_passengers_valid);
        assert!(mixed.can_proceed());

        let all = ValidationGate::evaluate([true, true]);
        assert!(all.all_passengers_valid);

        let none = ValidationGate::evaluate([false]);
        assert!(!none.can_proceed());
    }

    #[test]
    fn test_refresh_reports_flips() {
        let mut gate = ValidationGate::new();
        assert!(!gate.refresh([false]));
        assert!(gate.refresh([true]));
        assert!(!gate.refresh([true]));
        assert!(gate.status().all_passengers_valid);
    }
}
