pub mod cache;
pub mod delivery;
pub mod events;
pub mod intent;
pub mod notifier;
pub mod render;
