mod avm2;
mod cpool;
mod error;
mod extractor;
mod flags;
mod kind;
mod parser;
mod reader;
mod types;
mod writer;

pub use avm2::{Instr, InstrModel, InstrOperand, Op};
pub use error::{Error, Result};
pub use extractor::extract;
pub use flags::*;
pub use kind::{MultinameKind, TraitKind};
pub use parser::parse;
pub use reader::AbcRead;
pub use types::*;
pub use writer::AbcWrite;
