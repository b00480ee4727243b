pub mod admin;
pub mod contest;
pub mod shared;
pub mod standings;
pub mod verdict;
