//! Backends the deploy scripts can provision the CDP contracts against

mod seid;
mod simulated;

pub use seid::{SeidBackend, SeidConfig};
pub use simulated::SimulatedBackend;

/// A backend that signs every transaction as one known account
pub trait Signer {
    /// The signing account, which also administers every instantiated contract
    fn signer_address(&self) -> &str;
}
