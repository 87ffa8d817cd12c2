pub mod favorites;
pub mod responses;
pub mod storage;
pub mod upstream;
