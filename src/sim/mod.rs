pub mod command;
pub mod outcome;
pub mod save;
pub mod session;
pub mod state;
