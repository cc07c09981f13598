//! Form schemas.
//!
//! Each form pairs a loosely typed `*Input` record (every field optional,
//! exactly as submitted) with a strongly typed entity produced by
//! [`Schema::validate`]. Entities serialise to the remote API's wire shape.

mod application;
mod auth;
mod contact;
mod help;
mod settings;
mod testimonial;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::validation::Issues;

pub use self::application::{Application, ApplicationInput};
pub use self::auth::{
    AccountType, PasswordResetConfirm, PasswordResetConfirmInput, PasswordResetRequest,
    PasswordResetRequestInput, SignIn, SignInInput, SignUp, SignUpInput, check_password_strength,
};
pub use self::contact::{Contact, ContactInput};
pub use self::help::{
    Attachment, AttachmentInput, HelpRequest, HelpRequestInput, HelpSubject, MAX_ATTACHMENT_BYTES,
};
pub use self::settings::{NotificationPreferences, SettingKey, SettingsUpdate, SettingsUpdateInput};
pub use self::testimonial::{Testimonial, TestimonialInput, TestimonialKind};

/// A validated form entity.
pub trait Schema: Sized {
    /// Raw wire record accepted from clients.
    type Input: DeserializeOwned;

    /// Check every field constraint and build the entity.
    ///
    /// # Errors
    /// Returns every failing constraint.
    fn validate(input: Self::Input) -> Result<Self, Issues>;

    /// Decode an arbitrary JSON document and validate it.
    ///
    /// Type mismatches (for example a string where a number is expected)
    /// become a single root-level issue.
    ///
    /// # Errors
    /// Returns decoder or constraint issues.
    fn parse_json(value: Value) -> Result<Self, Issues> {
        let input = serde_json::from_value::<Self::Input>(value)
            .map_err(|error| Issues::root(format!("malformed form data: {error}")))?;
        Self::validate(input)
    }
}

/// Implements `FromStr`, `Display` and `as_str` for a closed wire vocabulary.
macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub enum $name {
            $( $(#[$variant_meta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every accepted wire value.
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            /// Wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

pub(crate) use wire_enum;
