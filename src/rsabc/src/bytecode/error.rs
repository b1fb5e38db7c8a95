use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading, writing or disassembling ABC bytecode.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source ended in the middle of a record.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// An encoded variable-length integer is longer than 5 bytes.
    #[error("malformed variable integer")]
    MalformedVariableInteger,

    /// A multiname kind byte is not one of the defined kinds.
    #[error("unknown multiname kind 0x{0:02x}")]
    UnknownMultinameKind(u8),

    /// The low 4 bits of a traits_info kind byte are not in 0..=6.
    #[error("unknown traits_info kind 0x{0:02x}")]
    UnknownTraitsInfoKind(u8),

    /// The disassembler read an opcode with no entry in the instruction table.
    #[error("unknown instruction 0x{0:02x}")]
    UnknownInstruction(u8),

    /// An operand type tag is not handled by the operand reader.
    #[error("unknown instruction operand")]
    UnknownInstructionOperand,

    /// The underlying byte source or sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Folds an i/o failure into the taxonomy, normalizing end-of-stream.
    pub(crate) fn from_read(err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(err)
        }
    }
}
