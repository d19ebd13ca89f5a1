pub mod keys;
pub mod math;
pub mod quarter;
pub mod response;
