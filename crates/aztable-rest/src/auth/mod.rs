//! SharedKey request authentication.
//!
//! Signing happens in two steps: the [`canonical`] functions reduce a
//! request to the header block and resource string the service expects,
//! and [`SharedKeySigner`] folds them into the `Authorization` value.

pub mod canonical;
mod signer;

pub use signer::{SharedKeySigner, SigningContext, SigningProfile};
