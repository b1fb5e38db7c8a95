use std::io::Read;

use paste::paste;

use super::{AbcRead, Error, MethodBodyInfo, Result};

/// The operand types an AVM2 instruction can declare.
///
/// `CaseCount` is the pseudo-type used only by `lookupswitch`: a u30 case
/// count followed by that many case offsets plus the trailing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrOperand {
    U30,
    U8,
    S24,
    CaseCount,
}

/// The static description of one AVM2 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrModel {
    pub op: Op,
    pub code: u8,
    pub name: &'static str,
    pub operands: &'static [InstrOperand],
}

impl InstrModel {
    /// Looks up the instruction model for an opcode byte.
    pub fn lookup(code: u8) -> Option<&'static InstrModel> {
        INSTRUCTIONS[code as usize].as_ref()
    }
}

/// A disassembled instruction.
///
/// Operands are at most 30 bits wide, so they are stored uniformly as u32;
/// s24 branch offsets are reinterpreted bit-for-bit.
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub model: InstrModel,
    pub operands: Vec<u32>,
}

macro_rules! instructions {
    ($($code:literal $name:ident [$($operand:ident),*];)*) => {
        paste! {
            /// Opcode identifiers, one per AVM2 instruction.
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum Op {
                $([<$name:camel>],)*
            }

            impl Op {
                /// The opcode byte of this instruction.
                pub fn code(self) -> u8 {
                    match self {
                        $(Op::[<$name:camel>] => $code,)*
                    }
                }

                /// The instruction mnemonic.
                pub fn name(self) -> &'static str {
                    match self {
                        $(Op::[<$name:camel>] => stringify!($name),)*
                    }
                }
            }

            /// The instruction table, indexed by opcode byte. Unassigned
            /// opcodes hold `None`.
            static INSTRUCTIONS: [Option<InstrModel>; 256] = {
                let mut table = [None; 256];
                $(table[$code as usize] = Some(InstrModel {
                    op: Op::[<$name:camel>],
                    code: $code,
                    name: stringify!($name),
                    operands: &[$(InstrOperand::$operand),*],
                });)*
                table
            };
        }
    };
}

instructions! {
    0xa0 add [];
    0xc5 add_i [];
    0x53 applytype [U30];
    0x86 astype [U30];
    0x87 astypelate [];
    0xa8 bitand [];
    0x97 bitnot [];
    0xa9 bitor [];
    0xaa bitxor [];
    0x41 call [U30];
    0x43 callmethod [U30, U30];
    0x46 callproperty [U30, U30];
    0x4c callproplex [U30, U30];
    0x4f callpropvoid [U30, U30];
    0x44 callstatic [U30, U30];
    0x45 callsuper [U30, U30];
    0x4e callsupervoid [U30, U30];
    0x78 checkfilter [];
    0x80 coerce [U30];
    0x82 coerce_a [];
    0x85 coerce_s [];
    0x42 construct [U30];
    0x4a constructprop [U30, U30];
    0x49 constructsuper [U30];
    0x76 convert_b [];
    0x73 convert_i [];
    0x75 convert_d [];
    0x77 convert_o [];
    0x74 convert_u [];
    0x70 convert_s [];
    0xef debug [U8, U30, U8, U30];
    0xf1 debugfile [U30];
    0xf0 debugline [U30];
    0x94 declocal [U30];
    0xc3 declocal_i [U30];
    0x93 decrement [];
    0xc1 decrement_i [];
    0x6a deleteproperty [U30];
    0xa3 divide [];
    0x2a dup [];
    0x06 dxns [U30];
    0x07 dxnslate [];
    0xab equals [];
    0x72 esc_xattr [];
    0x71 esc_xelem [];
    0x5e findproperty [U30];
    0x5d findpropstrict [U30];
    0x59 getdescendants [U30];
    0x64 getglobalscope [];
    0x6e getglobalslot [U30];
    0x60 getlex [U30];
    0x62 getlocal [U30];
    0xd0 getlocal_0 [];
    0xd1 getlocal_1 [];
    0xd2 getlocal_2 [];
    0xd3 getlocal_3 [];
    0x66 getproperty [U30];
    0x65 getscopeobject [U30];
    0x6c getslot [U30];
    0x04 getsuper [U30];
    0xb0 greaterequals [];
    0xaf greaterthan [];
    0x1f hasnext [];
    0x32 hasnext2 [U30, U30];
    0x13 ifeq [S24];
    0x12 iffalse [S24];
    0x18 ifge [S24];
    0x17 ifgt [S24];
    0x16 ifle [S24];
    0x15 iflt [S24];
    0x0f ifnge [S24];
    0x0e ifngt [S24];
    0x0d ifnle [S24];
    0x0c ifnlt [S24];
    0x14 ifne [S24];
    0x19 ifstricteq [S24];
    0x1a ifstrictne [S24];
    0x11 iftrue [S24];
    0xb4 in [];
    0x92 inclocal [U30];
    0xc2 inclocal_i [U30];
    0x91 increment [];
    0xc0 increment_i [];
    0x68 initproperty [U30];
    0xb1 instanceof [];
    0xb2 istype [U30];
    0xb3 istypelate [];
    0x10 jump [S24];
    0x08 kill [U30];
    0x09 label [];
    0xae lessequals [];
    0xad lessthan [];
    0x1b lookupswitch [S24, CaseCount];
    0xa5 lshift [];
    0xa4 modulo [];
    0xa2 multiply [];
    0xc7 multiply_i [];
    0x90 negate [];
    0xc4 negate_i [];
    0x57 newactivation [];
    0x56 newarray [U30];
    0x5a newcatch [U30];
    0x58 newclass [U30];
    0x40 newfunction [U30];
    0x55 newobject [U30];
    0x1e nextname [];
    0x23 nextvalue [];
    0x02 nop [];
    0x96 not [];
    0x29 pop [];
    0x1d popscope [];
    0x24 pushbyte [U8];
    0x2f pushdouble [U30];
    0x27 pushfalse [];
    0x2d pushint [U30];
    0x31 pushnamespace [U30];
    0x28 pushnan [];
    0x20 pushnull [];
    0x30 pushscope [];
    0x25 pushshort [U30];
    0x2c pushstring [U30];
    0x26 pushtrue [];
    0x2e pushuint [U30];
    0x21 pushundefined [];
    0x1c pushwith [];
    0x48 returnvalue [];
    0x47 returnvoid [];
    0xa6 rshift [];
    0x63 setlocal [U30];
    0xd4 setlocal_0 [];
    0xd5 setlocal_1 [];
    0xd6 setlocal_2 [];
    0xd7 setlocal_3 [];
    0x6f setglobalslot [U30];
    0x61 setproperty [U30];
    0x6d setslot [U30];
    0x05 setsuper [U30];
    0xac strictequals [];
    0xa1 subtract [];
    0xc6 subtract_i [];
    0x2b swap [];
    0x03 throw [];
    0x95 typeof [];
    0xa7 urshift [];
}

fn disassemble_operand<R: Read>(r: &mut R, operand: InstrOperand) -> Result<u32> {
    match operand {
        InstrOperand::U30 => r.read_u30(),
        InstrOperand::U8 => r.read_u8().map(u32::from),
        InstrOperand::S24 => r.read_s24().map(|v| v as u32),
        InstrOperand::CaseCount => Err(Error::UnknownInstructionOperand),
    }
}

fn disassemble_instr<R: Read>(r: &mut R, code: u8) -> Result<Instr> {
    let model = InstrModel::lookup(code).ok_or(Error::UnknownInstruction(code))?;
    let mut operands = Vec::new();
    for &operand in model.operands {
        if operand == InstrOperand::CaseCount {
            // the count precedes case_count + 1 offsets: the cases plus the
            // trailing one required by the format
            let count = r.read_u30()?;
            for _ in 0..=count {
                operands.push(disassemble_operand(r, InstrOperand::S24)?);
            }
        } else {
            operands.push(disassemble_operand(r, operand)?);
        }
    }
    Ok(Instr {
        model: *model,
        operands,
    })
}

impl MethodBodyInfo {
    /// Disassembles the code blob into its instruction sequence.
    ///
    /// Instructions are returned in the order they appear. The walk ends
    /// when the blob is exhausted at an opcode boundary; running out of
    /// bytes inside an instruction is an error, as is an opcode with no
    /// table entry.
    pub fn disassemble(&self) -> Result<Vec<Instr>> {
        let mut r = self.code.as_slice();
        let mut instructions = Vec::new();
        loop {
            let code = match AbcRead::read_u8(&mut r) {
                Ok(code) => code,
                Err(Error::UnexpectedEof) => break,
                Err(err) => return Err(err),
            };
            instructions.push(disassemble_instr(&mut r, code)?);
        }
        Ok(instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{AbcWrite, Error, MethodBodyInfo};
    use super::{InstrModel, InstrOperand, Op, INSTRUCTIONS};

    fn body(code: &[u8]) -> MethodBodyInfo {
        MethodBodyInfo {
            code: code.to_vec(),
            ..MethodBodyInfo::default()
        }
    }

    #[test]
    fn table_covers_the_avm2_instruction_set() {
        let count = INSTRUCTIONS.iter().filter(|m| m.is_some()).count();
        assert!(count >= 110, "only {count} instructions defined");
    }

    #[test]
    fn lookup_maps_codes_to_models() {
        let model = InstrModel::lookup(0xa0).unwrap();
        assert_eq!(model.op, Op::Add);
        assert_eq!(model.name, "add");
        assert!(model.operands.is_empty());

        let model = InstrModel::lookup(0xef).unwrap();
        assert_eq!(model.name, "debug");
        assert_eq!(
            model.operands,
            &[
                InstrOperand::U8,
                InstrOperand::U30,
                InstrOperand::U8,
                InstrOperand::U30
            ][..]
        );

        assert!(InstrModel::lookup(0x00).is_none());
    }

    #[test]
    fn op_exposes_code_and_mnemonic() {
        assert_eq!(Op::Lookupswitch.code(), 0x1b);
        assert_eq!(Op::Lookupswitch.name(), "lookupswitch");
        assert_eq!(Op::Pushundefined.code(), 0x21);
        assert_eq!(Op::In.name(), "in");
    }

    #[test]
    fn disassembles_a_straight_line_method() {
        // getlocal_0, pushscope, pushbyte 5, jump -3, returnvoid
        let instructions = body(&[0xd0, 0x30, 0x24, 0x05, 0x10, 0xfd, 0xff, 0xff, 0x47])
            .disassemble()
            .unwrap();
        let summary: Vec<(&str, &[u32])> = instructions
            .iter()
            .map(|i| (i.model.name, i.operands.as_slice()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("getlocal_0", &[][..]),
                ("pushscope", &[][..]),
                ("pushbyte", &[5][..]),
                ("jump", &[(-3i32) as u32][..]),
                ("returnvoid", &[][..]),
            ]
        );
    }

    #[test]
    fn empty_code_disassembles_to_nothing() {
        assert!(body(&[]).disassemble().unwrap().is_empty());
    }

    #[test]
    fn lookupswitch_reads_the_trailing_offset() {
        // default +5, case_count 1, offsets +10 and +20
        let instructions = body(&[
            0x1b, 0x05, 0x00, 0x00, 0x01, 0x0a, 0x00, 0x00, 0x14, 0x00, 0x00,
        ])
        .disassemble()
        .unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].model.op, Op::Lookupswitch);
        assert_eq!(instructions[0].operands, vec![5, 10, 20]);
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert!(matches!(
            body(&[0x02, 0x00]).disassemble(),
            Err(Error::UnknownInstruction(0x00))
        ));
    }

    #[test]
    fn truncated_operand_is_unexpected_eof() {
        // pushbyte with no operand byte
        assert!(matches!(
            body(&[0x24]).disassemble(),
            Err(Error::UnexpectedEof)
        ));
        // jump with a truncated s24
        assert!(matches!(
            body(&[0x10, 0x01]).disassemble(),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn reencoding_reproduces_the_code_bytes() {
        let code = &[
            0xd0, 0x30, 0x5d, 0x03, 0x24, 0x2a, 0x46, 0x03, 0x01, 0x29, 0x47,
        ];
        let instructions = body(code).disassemble().unwrap();

        let mut bytes: Vec<u8> = Vec::new();
        for instr in &instructions {
            bytes.write_u8(instr.model.code).unwrap();
            for (&operand, value) in instr.model.operands.iter().zip(&instr.operands) {
                match operand {
                    InstrOperand::U30 => bytes.write_u30(*value).unwrap(),
                    InstrOperand::U8 => bytes.write_u8(*value as u8).unwrap(),
                    InstrOperand::S24 => bytes.write_s24(*value as i32).unwrap(),
                    InstrOperand::CaseCount => unreachable!(),
                }
            }
        }
        assert_eq!(bytes, code);
    }
}
