pub mod cli;
pub mod completion;
