//! Session credential models: redacted secrets, store keys, and the access/refresh pair.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
