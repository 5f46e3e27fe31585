//! Bytecode instruction set and the growable instruction buffer.
//!
//! A program is a flat sequence of integer words. Each word is either an
//! opcode or the inline operand of the opcode before it; decoding is driven
//! by [`Opcode::operand_count`], so the words are not self-describing.
//! Addresses are zero-based offsets into the final, concatenated buffer, and
//! every address the compiler emits is relative to the instruction that
//! computes it, so buffers can be concatenated without patching.

use std::fmt;
use std::fmt::Write as _;

use lambdavm_foundation::{Error, ErrorKind, Result};

/// A single bytecode opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Opcode {
    /// Duplicate the top of stack: `[a] -> [a, a]`
    Dup = 0,
    /// Exchange the top two values: `[a, b] -> [b, a]`
    Swap = 1,
    /// Unconditional jump, relative to the address of this opcode.
    Jmp = 2,
    /// Pop an address, push the return address, jump.
    Call = 3,
    /// Pop the return-address stack into the program counter.
    Ret = 4,
    /// Push the value bound `n` frames out in the current environment.
    EnvLookup = 5,
    /// Pop a value and bind it in a fresh frame on the current environment.
    ExtendEnv = 6,
    /// Save the current environment, then switch to a popped environment.
    PushEnv = 7,
    /// Restore the most recently saved environment.
    PopEnv = 8,
    /// Push a reference to the current environment.
    GetEnv = 9,
    /// `[address, env] -> [closure]`
    MkClosure = 10,
    /// `[closure] -> [env]`
    GetClosureEnv = 11,
    /// `[closure] -> [address]`
    GetClosureCode = 12,
    /// Push the address of this opcode plus `d`.
    GetRelAddr = 13,
}

impl Opcode {
    /// All opcodes, in encoding order.
    pub const ALL: [Self; 14] = [
        Self::Dup,
        Self::Swap,
        Self::Jmp,
        Self::Call,
        Self::Ret,
        Self::EnvLookup,
        Self::ExtendEnv,
        Self::PushEnv,
        Self::PopEnv,
        Self::GetEnv,
        Self::MkClosure,
        Self::GetClosureEnv,
        Self::GetClosureCode,
        Self::GetRelAddr,
    ];

    /// Returns the integer word encoding this opcode.
    #[must_use]
    pub const fn word(self) -> i32 {
        self as i32
    }

    /// Number of inline operand words following this opcode.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Jmp | Self::EnvLookup | Self::GetRelAddr => 1,
            _ => 0,
        }
    }

    /// Returns the assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Dup => "DUP",
            Self::Swap => "SWAP",
            Self::Jmp => "JMP",
            Self::Call => "CALL",
            Self::Ret => "RET",
            Self::EnvLookup => "ENV_LOOKUP",
            Self::ExtendEnv => "EXTEND_ENV",
            Self::PushEnv => "PUSH_ENV",
            Self::PopEnv => "POP_ENV",
            Self::GetEnv => "GET_ENV",
            Self::MkClosure => "MK_CLOSURE",
            Self::GetClosureEnv => "GET_CLOSURE_ENV",
            Self::GetClosureCode => "GET_CLOSURE_CODE",
            Self::GetRelAddr => "GET_REL_ADDR",
        }
    }
}

impl TryFrom<i32> for Opcode {
    type Error = i32;

    fn try_from(word: i32) -> std::result::Result<Self, i32> {
        usize::try_from(word)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(word)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction: opcode, its address, and its operand if it has one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode word.
    pub address: usize,
    /// The opcode.
    pub opcode: Opcode,
    /// The inline operand, for opcodes that take one.
    pub operand: Option<i32>,
}

impl Instruction {
    /// Address of the word following this instruction and its operands.
    #[must_use]
    pub const fn next_address(&self) -> usize {
        self.address + 1 + self.opcode.operand_count()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Some(operand) => write!(f, "{} {operand}", self.opcode),
            None => write!(f, "{}", self.opcode),
        }
    }
}

/// A growable, append-only sequence of instruction words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytecode {
    words: Vec<i32>,
}

impl Bytecode {
    /// Creates an empty bytecode sequence.
    #[must_use]
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Appends an opcode without operands and returns its address.
    pub fn emit(&mut self, op: Opcode) -> usize {
        debug_assert_eq!(op.operand_count(), 0, "{op} takes an operand");
        let addr = self.words.len();
        self.words.push(op.word());
        addr
    }

    /// Appends an opcode with its inline operand and returns its address.
    pub fn emit_with(&mut self, op: Opcode, operand: i32) -> usize {
        debug_assert_eq!(op.operand_count(), 1, "{op} takes no operand");
        let addr = self.words.len();
        self.words.push(op.word());
        self.words.push(operand);
        addr
    }

    /// Concatenates `other` after `self`.
    ///
    /// No word is rewritten: the compiler only emits self-relative
    /// displacements, so both halves stay valid at their new offsets.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.words.extend(other.words);
        self
    }

    /// Overwrites the inline operand of the instruction at `address`.
    ///
    /// Used to fill in a forward jump once the distance is known.
    pub fn patch_operand(&mut self, address: usize, operand: i32) {
        debug_assert!(
            Opcode::try_from(self.words[address]).is_ok_and(|op| op.operand_count() == 1),
            "no operand at {address}"
        );
        self.words[address + 1] = operand;
    }

    /// Returns the number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if there are no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the raw instruction words.
    #[must_use]
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// Decodes the instruction starting at `address`.
    ///
    /// # Errors
    /// Returns an error if the word is not an opcode or its operand is missing.
    pub fn decode_at(&self, address: usize) -> Result<Instruction> {
        let word = *self
            .words
            .get(address)
            .ok_or_else(|| Error::new(ErrorKind::TruncatedInstruction { address }))?;
        let opcode = Opcode::try_from(word)
            .map_err(|word| Error::new(ErrorKind::InvalidOpcode { word, address }))?;
        let operand = if opcode.operand_count() == 1 {
            Some(
                *self
                    .words
                    .get(address + 1)
                    .ok_or_else(|| Error::new(ErrorKind::TruncatedInstruction { address }))?,
            )
        } else {
            None
        };
        Ok(Instruction {
            address,
            opcode,
            operand,
        })
    }

    /// Decodes the whole buffer linearly, from address 0.
    ///
    /// Lambda bodies are laid out inline, so a linear sweep visits every
    /// instruction the compiler emitted.
    ///
    /// # Errors
    /// Returns an error on the first undecodable instruction.
    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        let mut out = Vec::new();
        let mut address = 0;
        while address < self.words.len() {
            let instr = self.decode_at(address)?;
            address = instr.next_address();
            out.push(instr);
        }
        Ok(out)
    }

    /// Renders a human-readable listing, one instruction per line.
    ///
    /// Jump and address operands are annotated with their absolute target.
    /// Undecodable trailing words are shown raw.
    #[must_use]
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut address = 0;
        while address < self.words.len() {
            match self.decode_at(address) {
                Ok(instr) => {
                    let _ = write!(out, "{address:04}  {instr}");
                    if let (Opcode::Jmp | Opcode::GetRelAddr, Some(d)) =
                        (instr.opcode, instr.operand)
                    {
                        let target = i64::try_from(address).unwrap_or(i64::MAX) + i64::from(d);
                        let _ = write!(out, "  ; -> {target:04}");
                    }
                    out.push('\n');
                    address = instr.next_address();
                }
                Err(_) => {
                    let _ = writeln!(out, "{address:04}  .word {}", self.words[address]);
                    address += 1;
                }
            }
        }
        out
    }
}

impl From<Vec<i32>> for Bytecode {
    fn from(words: Vec<i32>) -> Self {
        Self { words }
    }
}
