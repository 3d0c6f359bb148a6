// Draft tracking: player catalog, roster construction, and draft state.

pub mod catalog;
pub mod position;
pub mod roster;
pub mod state;
