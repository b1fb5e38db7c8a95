mod linker;
mod types;

pub use linker::{link, LinkError};
pub use types::{Class, LinkedAbcFile, Method, Trait, TraitsObject};
