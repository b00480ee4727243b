mod common;

mod recovery;
mod standings;
mod verdict;
