pub mod ingredients;
pub mod sandwiches;
pub mod shared;
