//! Page workflow status.
//!
//! Each variant's discriminant is its rank in the `page_statuses` lookup table.
//! Only the split between "below Published" (a draft state) and "Published or
//! above" changes how a save is routed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// All variants in rank order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a status by its database ID.
            pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
                match id {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} id {other}",
                        stringify!($name)
                    ))),
                }
            }

            /// String representation for display, logging, and query params.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Page workflow status, ordered by rank.
    Status {
        Draft = 1 => "draft",
        Reviewed = 50 => "reviewed",
        Published = 100 => "published",
        Hidden = 101 => "hidden",
    }
}

impl Status {
    /// `true` for any status ranked below [`Status::Published`].
    ///
    /// Saves in a draft state are captured as versions only; the live record
    /// keeps whatever was last published.
    pub fn is_draft(self) -> bool {
        self < Status::Published
    }

    /// `true` for [`Status::Published`] and anything ranked above it.
    pub fn is_live(self) -> bool {
        !self.is_draft()
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Draft
    }
}
