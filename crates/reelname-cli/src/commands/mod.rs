pub mod completion;
pub mod describe;
pub mod driver;
pub mod platform;
