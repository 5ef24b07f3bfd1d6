//! Keyed token stores that merge observations of the same canonical value.
//!
//! Each domain extractor owns one [`TokenRegistry`]. Registries live for a single run and are
//! shared by every page task; [`TokenRegistry::finalize`] turns them into sorted, uniquely named
//! [`ExtractedToken`]s once all pages are in.

mod extracted_token;
mod token_registry;

pub use extracted_token::{ExtractedToken, TokenSource};
pub use token_registry::{FinalizedTokens, TokenDraft, TokenRegistry, finalize_drafts};
