use serde::{Deserialize, Serialize};

/// Declares a typed surrogate identifier.
///
/// Each aggregate gets its own id type to prevent mixing up, say, an owner
/// id with a patient id. The raw value is the storage-assigned surrogate
/// key; aggregates carry `Option<XxxId>` until their first save.
macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from a raw surrogate value.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw surrogate value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Identifier of a pet owner.
    OwnerId
}

entity_id! {
    /// Identifier of a patient (pet).
    PatientId
}

entity_id! {
    /// Identifier of an appointment.
    AppointmentId
}

entity_id! {
    /// Identifier of a medical record entry.
    MedicalRecordId
}

entity_id! {
    /// Identifier of a veterinarian, referencing an externally managed
    /// user record.
    VeterinarianId
}

entity_id! {
    /// Identifier of an audit log entry.
    AuditLogId
}
