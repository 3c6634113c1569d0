//! Account lifecycle: sign-in state machine, challenge port, and registry.

pub mod auth;
pub mod challenge;
pub mod registry;

pub use auth::{AuthFlow, AuthState};
pub use challenge::{ChallengeHandler, PresetChallenge};
pub use registry::AccountRegistry;
