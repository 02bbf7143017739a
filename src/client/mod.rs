//! Client-side half of the application: the session controller that talks to
//! the REST API and the pure view logic the task pages render from. Nothing
//! in here touches the database; everything goes through the HTTP surface.

pub mod session;
pub mod view;

pub use session::{
    ClientConfig, ClientError, CompletedChoice, Session, SessionController, TaskDraft, TaskPatch,
};
pub use view::{TaskCounts, TaskFilter, TaskSort};
