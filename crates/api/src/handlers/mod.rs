pub mod pages;
pub mod resolve;
