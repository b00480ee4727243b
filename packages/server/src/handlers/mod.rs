pub mod admin;
pub mod contest;
pub mod standings;
pub mod verdict;
