pub mod errors;
pub mod models;
pub mod providers;
pub mod session;
pub mod splitter;
pub mod turn;
