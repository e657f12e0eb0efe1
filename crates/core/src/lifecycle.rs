//! Booking status transitions and who may perform them.

use sns_types::BookingStatus;

use crate::{CoreError, CoreResult};

/// Which side of a booking is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Customer,
    Professional,
}

/// Statuses reachable from `from` in one step.
pub fn next_statuses(from: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;
    match from {
        Confirmed => &[InProgress, Cancelled],
        InProgress => &[Completed, Cancelled],
        Completed | Cancelled => &[],
    }
}

pub fn check_transition(from: BookingStatus, to: BookingStatus) -> CoreResult<()> {
    if next_statuses(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::invalid(format!(
            "Invalid status transition from {from} to {to}"
        )))
    }
}

/// Work progress is reported by the professional; either party may cancel.
pub fn check_actor(to: BookingStatus, party: Party) -> CoreResult<()> {
    let allowed = match to {
        BookingStatus::InProgress | BookingStatus::Completed => party == Party::Professional,
        BookingStatus::Cancelled => true,
        BookingStatus::Confirmed => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(CoreError::forbidden(format!(
            "Not authorized to mark this booking as {to}"
        )))
    }
}

/// Body of the notification sent to the other party after a status change.
pub fn status_notice(to: BookingStatus) -> &'static str {
    match to {
        BookingStatus::Confirmed => "Your booking is confirmed",
        BookingStatus::InProgress => "Work on your booking has started",
        BookingStatus::Completed => "Your booking has been completed",
        BookingStatus::Cancelled => "Your booking has been cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn transition_table() {
        let allowed = [
            (Confirmed, InProgress),
            (Confirmed, Cancelled),
            (InProgress, Completed),
            (InProgress, Cancelled),
        ];
        for &from in BookingStatus::ALL {
            for &to in BookingStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    check_transition(from, to).is_ok(),
                    expected,
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn rejected_transition_names_both_states() {
        let err = check_transition(Completed, InProgress).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status transition from completed to in_progress"
        );
    }

    #[test]
    fn only_professional_reports_progress() {
        assert!(check_actor(InProgress, Party::Professional).is_ok());
        assert!(check_actor(Completed, Party::Professional).is_ok());
        assert!(matches!(
            check_actor(Completed, Party::Customer),
            Err(CoreError::Forbidden(_))
        ));
        assert!(check_actor(Cancelled, Party::Customer).is_ok());
        assert!(check_actor(Cancelled, Party::Professional).is_ok());
    }
}
