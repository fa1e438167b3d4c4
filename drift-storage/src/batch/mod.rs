pub mod commands;
pub mod writer;

pub use commands::BatchCommand;
pub use writer::BatchWriter;
