//! Background [`Task`]s definitions.

mod background;
pub mod closing_reminders;

pub use common::Handler as Task;

pub use self::{
    background::Background, closing_reminders::ClosingReminders,
};
