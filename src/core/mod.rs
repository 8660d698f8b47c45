pub mod catalog;
pub mod clipboard;
pub mod generator;
pub mod normalize;
pub mod scheduler;
pub mod storage;
