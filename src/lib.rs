//! Issuing of [JSON web tokens (JWT)][JWT] asserting the identity of a user
//! and their group memberships to the GoInstant platform.
//!
//! Tokens are signed with `HS256` (HMAC-SHA256) using a secret key shared with the service
//! verifying them. This crate only issues tokens; it does not parse or verify them.
//!
//! # Design choices
//!
//! - The shared secret is decoded once, when creating a [`Signer`], and is zeroized
//!   when the signer is dropped. Both base64 and base64url encodings of the key are accepted,
//!   with or without padding.
//! - User data is either a typed [`UserIdentity`] or any value serializing to a JSON object
//!   of the same shape (e.g., produced by [`serde_json::json!`]). Data is validated
//!   against the [`ClaimSchema`] before any signing work.
//! - Claims are serialized in a fixed order: fields not mentioned in the schema in their
//!   original order, followed by the renamed claims (`iss`, `sub`, `dn`, `g`) and `aud`.
//!   Since the signature covers the serialized bytes, this order is a part of the token format.
//! - [`Signer::sign()`] is an `async` counterpart to [`Signer::sign_sync()`]. It yields
//!   to the executor once before computing the digest, unless configured otherwise.
//!
//! # Claim mapping
//!
//! | User field | Claim |
//! |------------|-------|
//! | `domain` | `iss` |
//! | `id` | `sub` |
//! | `displayName` | `dn` |
//! | `groups` (optional) | `g` |
//! | `groups[i].id` | `g[i].id` |
//! | `groups[i].displayName` | `g[i].dn` |
//! | - | `aud` (always `"goinstant.net"`) |
//!
//! Other fields of the user data and of each group are copied to the claims as is.
//! The token header always has `typ` set to `"JWT"` and `alg` set to `"HS256"`; extra header
//! fields may be supplied via [`ExtraHeaders`].
//!
//! [JWT]: https://jwt.io/
//!
//! # Examples
//!
//! ```
//! use goinstant_auth::{ExtraHeaders, GroupClaim, Signer, UserIdentity};
//!
//! # fn main() -> anyhow::Result<()> {
//! let signer = Signer::new("HKYdFdnezle2yrI2_Ph3cHz144bISk-cvuAbeAAA999")?;
//! let user = UserIdentity::new("example.com", "bar", "bob")
//!     .with_group(GroupClaim::new(1234, "Group 1234"))
//!     .with_group(GroupClaim::new(42, "Meaning Group"));
//! let token = signer.sign_sync(&user)?;
//! assert!(token.ends_with(".5isd3i1A4so7MwKm0VHWYHuWRy3WwGFipO0kkelNRLU"));
//!
//! // Tokens may carry additional header fields.
//! let headers = ExtraHeaders::empty().with_key_id("my-key");
//! let token = signer.sign_sync_with_headers(&user, &headers)?;
//! println!("token: {token}");
//! # Ok(())
//! # } // end main()
//! ```
//!
//! Asynchronous signing produces the same tokens:
//!
//! ```
//! # use goinstant_auth::{Signer, UserIdentity};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let signer = Signer::new("HKYdFdnezle2yrI2_Ph3cHz144bISk-cvuAbeAAA999")?;
//! let user = UserIdentity::new("example.com", "bar", "bob").with_groups([]);
//! let token = signer.sign(&user).await?;
//! assert_eq!(token, signer.sign_sync(&user)?);
//! assert!(token.ends_with(".4eb8Wxzu2S9vnoV1Q--8evzZC8FAlqBlUBCeeWZ9xK8"));
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/goinstant-auth/0.1.0")]
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

mod claims;
mod error;
mod key;
mod schema;
mod signer;

/// Prelude to neatly import all necessary stuff from the crate.
pub mod prelude {
    pub use crate::{ExtraHeaders, GroupClaim, Signer, UserIdentity};
}

pub use crate::{
    claims::{ExtraHeaders, GroupClaim, Obj, UserIdentity},
    error::{KeyError, SigningError},
    key::SecretKey,
    schema::{ClaimSchema, ClaimTable, ALGORITHM, DEFAULT_AUDIENCE, TOKEN_TYPE},
    signer::Signer,
};
