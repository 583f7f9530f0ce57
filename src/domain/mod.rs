pub mod chain;
pub mod entity;
pub mod gesture;
pub mod jump;
