//! Script Classifier
//!
//! Decides what kind of output script we are looking at:
//!
//! - **DataCarrying**: first instruction is `OP_RETURN`; the value is burned
//! - **Address**: one of the standard templates
//!   - P2PKH: `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
//!   - P2SH: `OP_HASH160 <20 bytes> OP_EQUAL`
//!   - P2TR: `OP_SCRIPTTYPE OP_1 <33 byte commitment> [<32 byte state>]`
//! - **Other**: everything else, flagged `malformed` when the push lengths do
//!   not fit inside the script
//!
//! Template matching is exact: the instruction sequence and the overall length
//! must both match, so non-minimal pushes never classify as an address.

use crate::types::Script;

/// Script opcodes used by the templates and the RANK payload
#[allow(dead_code)]
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_1: u8 = 0x51;
    pub const OP_16: u8 = 0x60;
    pub const OP_SCRIPTTYPE: u8 = 0x62;
    pub const OP_RETURN: u8 = 0x6a;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
}

use opcodes::*;

/// A single decoded script instruction.
///
/// `OP_0` and the small-integer opcodes are reported as `Op`, not as pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    Op(u8),
    Push(&'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScriptDecodeError {
    #[error("length prefix at offset {offset} is truncated")]
    TruncatedLength { offset: usize },
    #[error("push at offset {offset} runs past end of script")]
    TruncatedPush { offset: usize },
}

/// Iterator over the instructions of a raw script.
///
/// Stops after the first decode error.
pub struct Instructions<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            failed: false,
        }
    }

    fn read_len(&mut self, width: usize, offset: usize) -> Result<usize, ScriptDecodeError> {
        let end = self.pos + width;
        let raw = self
            .bytes
            .get(self.pos..end)
            .ok_or(ScriptDecodeError::TruncatedLength { offset })?;
        self.pos = end;
        // little-endian length
        Ok(raw.iter().rev().fold(0usize, |acc, b| (acc << 8) | *b as usize))
    }

    fn step(&mut self) -> Result<Instruction<'a>, ScriptDecodeError> {
        let offset = self.pos;
        let opcode = self.bytes[offset];
        self.pos += 1;

        let len = match opcode {
            0x01..=0x4b => opcode as usize,
            OP_PUSHDATA1 => self.read_len(1, offset)?,
            OP_PUSHDATA2 => self.read_len(2, offset)?,
            OP_PUSHDATA4 => self.read_len(4, offset)?,
            _ => return Ok(Instruction::Op(opcode)),
        };

        let end = self
            .pos
            .checked_add(len)
            .ok_or(ScriptDecodeError::TruncatedPush { offset })?;
        let data = self
            .bytes
            .get(self.pos..end)
            .ok_or(ScriptDecodeError::TruncatedPush { offset })?;
        self.pos = end;
        Ok(Instruction::Push(data))
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ScriptDecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        let result = self.step();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Standard address template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    P2pkh,
    P2sh,
    P2tr,
}

impl AddressKind {
    /// Script type name understood by the indexer's script endpoints
    pub fn indexer_type(&self) -> &'static str {
        match self {
            AddressKind::P2pkh => "p2pkh",
            AddressKind::P2sh => "p2sh",
            AddressKind::P2tr => "p2tr-commitment",
        }
    }
}

/// Classification of an output script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    DataCarrying,
    Address(AddressKind),
    Other { malformed: bool },
}

impl ScriptClass {
    pub fn is_data_carrying(&self) -> bool {
        matches!(self, ScriptClass::DataCarrying)
    }

    pub fn address_kind(&self) -> Option<AddressKind> {
        match self {
            ScriptClass::Address(kind) => Some(*kind),
            _ => None,
        }
    }
}

pub fn classify(script: &Script) -> ScriptClass {
    classify_bytes(script.as_bytes())
}

/// Classify raw script bytes. Never fails; undecodable scripts are
/// `Other { malformed: true }`.
pub fn classify_bytes(bytes: &[u8]) -> ScriptClass {
    if bytes.first() == Some(&OP_RETURN) {
        return ScriptClass::DataCarrying;
    }
    match template_match(bytes) {
        Ok(Some((kind, _))) => ScriptClass::Address(kind),
        Ok(None) => ScriptClass::Other { malformed: false },
        Err(_) => ScriptClass::Other { malformed: true },
    }
}

/// Payload embedded in an address script: the 20-byte hash for P2PKH/P2SH,
/// the 33-byte commitment for P2TR.
pub fn address_payload(bytes: &[u8]) -> Option<(AddressKind, &[u8])> {
    if bytes.first() == Some(&OP_RETURN) {
        return None;
    }
    template_match(bytes).ok().flatten()
}

fn template_match(bytes: &[u8]) -> Result<Option<(AddressKind, &[u8])>, ScriptDecodeError> {
    let instructions = Instructions::new(bytes).collect::<Result<Vec<_>, _>>()?;

    use Instruction::{Op, Push};
    let matched = match instructions.as_slice() {
        [Op(OP_DUP), Op(OP_HASH160), Push(hash), Op(OP_EQUALVERIFY), Op(OP_CHECKSIG)]
            if hash.len() == 20 && bytes.len() == 25 =>
        {
            Some((AddressKind::P2pkh, *hash))
        }
        [Op(OP_HASH160), Push(hash), Op(OP_EQUAL)] if hash.len() == 20 && bytes.len() == 23 => {
            Some((AddressKind::P2sh, *hash))
        }
        [Op(OP_SCRIPTTYPE), Op(OP_1), Push(commitment)]
            if commitment.len() == 33 && bytes.len() == 36 =>
        {
            Some((AddressKind::P2tr, *commitment))
        }
        [Op(OP_SCRIPTTYPE), Op(OP_1), Push(commitment), Push(state)]
            if commitment.len() == 33 && state.len() == 32 && bytes.len() == 69 =>
        {
            Some((AddressKind::P2tr, *commitment))
        }
        _ => None,
    };
    Ok(matched)
}
