//! Service status enumerations
//!
//! Each enumeration mirrors the closed set of status strings a service
//! reports for one kind of asynchronous job. Strings outside the set are
//! kept as `Unrecognized` so that classification, not parsing, decides
//! what to do with them.
//!
//! The same status set is read differently depending on what the caller
//! waits for, so every enumeration exposes one classifier per goal
//! (e.g. [`ModelStatus::training`] and [`ModelStatus::hosting`]).

macro_rules! service_status {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A status string outside the known set
            Unrecognized(String),
        }

        impl $name {
            /// The status string as reported by the service
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Unrecognized(other) => other.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $( $wire => $name::$variant, )+
                    other => $name::Unrecognized(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod lookout_vision;
pub mod rekognition;

pub use lookout_vision::{DatasetStatus, ModelStatus};
pub use rekognition::{ProjectVersionStatus, VideoJobStatus};
