//! Relnotify — decides whether a social-graph change (unfriend, guild
//! kick/ban, group removal) was involuntary from the local user's
//! perspective and, only then, raises a notification. Voluntary changes
//! produce stream events that look identical on the wire; the engine
//! suppresses those by tracking locally-initiated actions.
//!
//! The host wires it up by priming the membership cache, forwarding
//! transport events into [`engine::notifier::Notifier::handle_raw`], and
//! draining the toast/desktop sink channels into its widgets.

pub mod config;
pub mod directory;
pub mod engine;


pub use config::NotifierConfig;
pub use directory::{InMemoryDirectory, UserDirectory, UserRecord};
pub use engine::notifier::Notifier;
