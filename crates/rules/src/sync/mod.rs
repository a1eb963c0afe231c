//! Remote rule synchronization.
//!
//! A [`RuleFetcher`] refreshes a local checkout of the remote rule
//! repository; [`RemoteSynchronizer`] loads every rule file in that checkout
//! and swaps the result into the [`RuleStore`](crate::store::RuleStore).
//! Periodic refresh is opt-in via [`RemoteSynchronizer::start`].

mod core;
mod fetcher;

#[cfg(test)]
mod tests;

pub use self::core::{RemoteSynchronizer, SyncHandle, SyncReport};
pub use self::fetcher::{GitFetcher, RuleFetcher};
