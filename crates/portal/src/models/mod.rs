//! Types the portal keeps in the reader's session.
//!
//! Everything here is serialized into the tower-sessions record, so each
//! type is `Serialize + Deserialize` and holds only what the next request
//! needs.

pub mod admin;
pub mod home;
pub mod notice;
pub mod session;

pub use admin::AdminPanel;
pub use home::HomeState;
pub use notice::{Notice, NoticeLevel};
pub use session::{CurrentSession, keys as session_keys};
