mod customer;
mod owner;

pub use customer::*;
pub use owner::*;
