mod action;
mod backend;
mod document;
mod error;
mod event;
mod session;
mod state;
mod suggestion;
mod transition;

pub use action::*;
pub use backend::*;
pub use document::*;
pub use error::*;
pub use event::*;
pub use session::*;
pub use state::*;
pub use suggestion::*;
pub use transition::*;
