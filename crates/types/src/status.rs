//! Closed vocabularies persisted as lowercase text columns.

use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted value is not part of a vocabulary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Account type. Professionals offer services in a single category.
    UserRole ("role") {
        Customer => "customer",
        Pro => "pro",
    }
}

text_enum! {
    RequestStatus ("request status") {
        Open => "open",
        Matched => "matched",
        Booked => "booked",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    Urgency ("urgency") {
        Immediate => "immediate",
        Scheduled => "scheduled",
    }
}

text_enum! {
    /// Lifecycle of a booking created from an accepted price.
    BookingStatus ("booking status") {
        Confirmed => "confirmed",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    MessageType ("message type") {
        Text => "text",
        PriceProposal => "price_proposal",
        PriceAccept => "price_accept",
        PriceReject => "price_reject",
        System => "system",
        Voice => "voice",
        Image => "image",
    }
}

text_enum! {
    ChatRoomStatus ("chat room status") {
        Active => "active",
        Closed => "closed",
    }
}

text_enum! {
    PaymentStatus ("payment status") {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
}

text_enum! {
    DevicePlatform ("platform") {
        Android => "android",
        Ios => "ios",
        Web => "web",
    }
}

text_enum! {
    RecurrencePattern ("recurrence pattern") {
        Daily => "daily",
        Weekly => "weekly",
        Weekdays => "weekdays",
    }
}

text_enum! {
    /// Channel used to deliver one-time passwords.
    DeliveryMethod ("delivery method") {
        Sms => "sms",
        Whatsapp => "whatsapp",
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Immediate
    }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

impl Default for DeliveryMethod {
    fn default() -> Self {
        DeliveryMethod::Sms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips_through_from_str() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn serde_uses_stored_text() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: MessageType = serde_json::from_str("\"price_proposal\"").unwrap();
        assert_eq!(parsed, MessageType::PriceProposal);
    }

    #[test]
    fn unknown_text_names_the_vocabulary() {
        let err = "admin".parse::<UserRole>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role: admin");
    }
}
