pub mod classifier;
pub mod predicate;
pub mod progress;
pub mod ranker;
pub mod scanner;
