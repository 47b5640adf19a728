pub mod spin;
pub mod warm;
