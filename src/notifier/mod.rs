pub mod delivery;
pub mod format;
pub mod resize;
mod worker;

pub use delivery::{HttpImageFetcher, ImageDelivery};
pub use worker::Notifier;

#[cfg(test)]
pub(crate) mod support;
