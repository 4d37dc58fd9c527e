pub mod edit_gateway;
pub mod session;

pub use edit_gateway::EditGateway;
pub use session::{EditSession, LoadOutcome, SessionEvent, SessionSnapshot};
