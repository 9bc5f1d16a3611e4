pub mod base;
pub mod configs;
pub mod groq;
pub mod mock;
