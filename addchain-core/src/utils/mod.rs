pub mod errors;
pub mod math;
pub mod sorted;
pub mod vector;
