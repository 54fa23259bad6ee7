mod build;
mod io;
mod process;

pub use build::*;
pub use io::*;
pub use process::*;
