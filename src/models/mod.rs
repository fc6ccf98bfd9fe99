pub mod courier;
pub mod establishment;
pub mod order;
pub mod workforce;
