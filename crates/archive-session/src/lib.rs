//! archive-session: the context object an interface binds to.
//!
//! [`ArchiveSession`] owns the item store, the active [`Criteria`], the
//! search history, display preferences, and the notification queue, and
//! recomputes every derived view on demand.
//!
//! [`Criteria`]: archive_core::Criteria

pub mod error;
pub mod history;
pub mod preferences;
pub mod session;

pub use error::{Result, SessionError};
pub use history::SearchHistory;
pub use preferences::{PreferenceValues, Preferences, Theme, ViewMode};
pub use session::{ArchiveSession, ExportFile};
