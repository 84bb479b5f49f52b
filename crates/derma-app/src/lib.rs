//! Application flows shared by every front end: session restore, login,
//! cart and checkout, chat history and view routing.

mod app;


pub use app::{App, ChatTurn, EMPTY_REPLY, UNREACHABLE_REPLY};
