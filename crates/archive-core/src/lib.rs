//! archive-core: research item model, store, and derived-view engine.
//!
//! Items (papers, videos, documentaries, images) live in an ordered
//! collection owned by [`ResearchStore`], which writes through to a
//! [`KeyValueStore`] on every mutation. The [`query`] module derives every
//! filtered, sorted, and faceted view from that collection.

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod item;
pub mod notification;
pub mod persistence;
pub mod query;
pub mod sample;
pub mod store;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use item::*;
pub use notification::*;
pub use persistence::*;
pub use query::*;
pub use store::*;
