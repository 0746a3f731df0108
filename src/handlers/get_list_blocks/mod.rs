pub mod models;
mod src;

pub use src::*;
