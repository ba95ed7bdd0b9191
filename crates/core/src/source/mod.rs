mod reader;

pub use reader::{read_source, SourceDocument};
