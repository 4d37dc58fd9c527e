//! Edit session services.
//!
//! An [`EditSession`] owns the version timeline for one uploaded character
//! and routes every edit through the [`EditGateway`](crate::EditGateway).

mod edit_session;
mod event;

pub use edit_session::{EditSession, LoadOutcome};
pub use event::{SessionEvent, SessionSnapshot};
