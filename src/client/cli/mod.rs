mod agent;
mod io;

pub use agent::Agent;
pub use io::StdinInput;
