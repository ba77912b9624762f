//! The 256-entry opcode table.
//!
//! Every opcode maps to a handler kind, its length in bytes, the set of flags
//! it may change and its assembler mnemonic. The twelve unassigned opcodes are
//! an explicit [`Op::Illegal`] entry rather than a missing one.

use crate::cpu::i8080::Flag;

/// Handler kind. Register/condition fields are decoded from the opcode by
/// the handler itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    // Data transfer
    Mov,
    Mvi,
    Lxi,
    Lda,
    Sta,
    Lhld,
    Shld,
    Ldax,
    Stax,
    Xchg,

    // Arithmetic / logic
    Alu,    // ADD ADC SUB SBB ANA XRA ORA CMP with register/memory source
    AluImm, // ADI ACI SUI SBI ANI XRI ORI CPI
    Inr,
    Dcr,
    Inx,
    Dcx,
    Dad,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Daa,
    Cma,
    Stc,
    Cmc,

    // Branch
    Jmp,
    Jcc,
    Call,
    Ccc,
    Ret,
    Rcc,
    Rst,
    Pchl,

    // Stack
    Push,
    Pop,
    Xthl,
    Sphl,

    // I/O and machine control
    In,
    Out,
    Ei,
    Di,
    Nop,
    Hlt,

    Illegal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub op: Op,
    /// Instruction length in bytes, opcode included.
    pub length: u8,
    /// Flags the instruction may modify, as [`Flag`] bits.
    pub flags: u8,
    pub mnemonic: &'static str,
}

const ALL: u8 = Flag::S as u8 | Flag::Z as u8 | Flag::AC as u8 | Flag::P as u8 | Flag::CY as u8;
const ZSPA: u8 = Flag::S as u8 | Flag::Z as u8 | Flag::AC as u8 | Flag::P as u8;
const CY: u8 = Flag::CY as u8;

#[rustfmt::skip]
const MNEMONICS: [&str; 256] = [
    "NOP", "LXI B,d16", "STAX B", "INX B", "INR B", "DCR B", "MVI B,d8", "RLC", // 0x00
    "???", "DAD B", "LDAX B", "DCX B", "INR C", "DCR C", "MVI C,d8", "RRC", // 0x08
    "???", "LXI D,d16", "STAX D", "INX D", "INR D", "DCR D", "MVI D,d8", "RAL", // 0x10
    "???", "DAD D", "LDAX D", "DCX D", "INR E", "DCR E", "MVI E,d8", "RAR", // 0x18
    "???", "LXI H,d16", "SHLD a16", "INX H", "INR H", "DCR H", "MVI H,d8", "DAA", // 0x20
    "???", "DAD H", "LHLD a16", "DCX H", "INR L", "DCR L", "MVI L,d8", "CMA", // 0x28
    "???", "LXI SP,d16", "STA a16", "INX SP", "INR M", "DCR M", "MVI M,d8", "STC", // 0x30
    "???", "DAD SP", "LDA a16", "DCX SP", "INR A", "DCR A", "MVI A,d8", "CMC", // 0x38
    "MOV B,B", "MOV B,C", "MOV B,D", "MOV B,E", "MOV B,H", "MOV B,L", "MOV B,M", "MOV B,A", // 0x40
    "MOV C,B", "MOV C,C", "MOV C,D", "MOV C,E", "MOV C,H", "MOV C,L", "MOV C,M", "MOV C,A", // 0x48
    "MOV D,B", "MOV D,C", "MOV D,D", "MOV D,E", "MOV D,H", "MOV D,L", "MOV D,M", "MOV D,A", // 0x50
    "MOV E,B", "MOV E,C", "MOV E,D", "MOV E,E", "MOV E,H", "MOV E,L", "MOV E,M", "MOV E,A", // 0x58
    "MOV H,B", "MOV H,C", "MOV H,D", "MOV H,E", "MOV H,H", "MOV H,L", "MOV H,M", "MOV H,A", // 0x60
    "MOV L,B", "MOV L,C", "MOV L,D", "MOV L,E", "MOV L,H", "MOV L,L", "MOV L,M", "MOV L,A", // 0x68
    "MOV M,B", "MOV M,C", "MOV M,D", "MOV M,E", "MOV M,H", "MOV M,L", "HLT", "MOV M,A", // 0x70
    "MOV A,B", "MOV A,C", "MOV A,D", "MOV A,E", "MOV A,H", "MOV A,L", "MOV A,M", "MOV A,A", // 0x78
    "ADD B", "ADD C", "ADD D", "ADD E", "ADD H", "ADD L", "ADD M", "ADD A", // 0x80
    "ADC B", "ADC C", "ADC D", "ADC E", "ADC H", "ADC L", "ADC M", "ADC A", // 0x88
    "SUB B", "SUB C", "SUB D", "SUB E", "SUB H", "SUB L", "SUB M", "SUB A", // 0x90
    "SBB B", "SBB C", "SBB D", "SBB E", "SBB H", "SBB L", "SBB M", "SBB A", // 0x98
    "ANA B", "ANA C", "ANA D", "ANA E", "ANA H", "ANA L", "ANA M", "ANA A", // 0xA0
    "XRA B", "XRA C", "XRA D", "XRA E", "XRA H", "XRA L", "XRA M", "XRA A", // 0xA8
    "ORA B", "ORA C", "ORA D", "ORA E", "ORA H", "ORA L", "ORA M", "ORA A", // 0xB0
    "CMP B", "CMP C", "CMP D", "CMP E", "CMP H", "CMP L", "CMP M", "CMP A", // 0xB8
    "RNZ", "POP B", "JNZ a16", "JMP a16", "CNZ a16", "PUSH B", "ADI d8", "RST 0", // 0xC0
    "RZ", "RET", "JZ a16", "???", "CZ a16", "CALL a16", "ACI d8", "RST 1", // 0xC8
    "RNC", "POP D", "JNC a16", "OUT d8", "CNC a16", "PUSH D", "SUI d8", "RST 2", // 0xD0
    "RC", "???", "JC a16", "IN d8", "CC a16", "???", "SBI d8", "RST 3", // 0xD8
    "RPO", "POP H", "JPO a16", "XTHL", "CPO a16", "PUSH H", "ANI d8", "RST 4", // 0xE0
    "RPE", "PCHL", "JPE a16", "XCHG", "CPE a16", "???", "XRI d8", "RST 5", // 0xE8
    "RP", "POP PSW", "JP a16", "DI", "CP a16", "PUSH PSW", "ORI d8", "RST 6", // 0xF0
    "RM", "SPHL", "JM a16", "EI", "CM a16", "???", "CPI d8", "RST 7", // 0xF8
];

pub static OPCODES: [OpcodeInfo; 256] = {
    let mut table = [OpcodeInfo { op: Op::Illegal, length: 1, flags: 0, mnemonic: "???" }; 256];
    let mut i = 0;
    while i < 256 {
        let (op, length, flags) = decode(i as u8);
        table[i] = OpcodeInfo { op, length, flags, mnemonic: MNEMONICS[i] };
        i += 1;
    }
    table
};

/// Opcode layout: `xx yyy zzz`.
const fn decode(opcode: u8) -> (Op, u8, u8) {
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    match opcode >> 6 {
        0 => match z {
            0 if y == 0 => (Op::Nop, 1, 0),
            0 => (Op::Illegal, 1, 0),
            1 if y & 1 == 0 => (Op::Lxi, 3, 0),
            1 => (Op::Dad, 1, CY),
            2 => match y {
                0 | 2 => (Op::Stax, 1, 0),
                1 | 3 => (Op::Ldax, 1, 0),
                4 => (Op::Shld, 3, 0),
                5 => (Op::Lhld, 3, 0),
                6 => (Op::Sta, 3, 0),
                _ => (Op::Lda, 3, 0),
            },
            3 if y & 1 == 0 => (Op::Inx, 1, 0),
            3 => (Op::Dcx, 1, 0),
            4 => (Op::Inr, 1, ZSPA),
            5 => (Op::Dcr, 1, ZSPA),
            6 => (Op::Mvi, 2, 0),
            _ => match y {
                0 => (Op::Rlc, 1, CY),
                1 => (Op::Rrc, 1, CY),
                2 => (Op::Ral, 1, CY),
                3 => (Op::Rar, 1, CY),
                4 => (Op::Daa, 1, ALL),
                5 => (Op::Cma, 1, 0),
                6 => (Op::Stc, 1, CY),
                _ => (Op::Cmc, 1, CY),
            },
        },
        1 if opcode == 0x76 => (Op::Hlt, 1, 0),
        1 => (Op::Mov, 1, 0),
        2 => (Op::Alu, 1, ALL),
        _ => match z {
            0 => (Op::Rcc, 1, 0),
            1 => match y {
                0 | 2 | 4 => (Op::Pop, 1, 0),
                6 => (Op::Pop, 1, ALL), // POP PSW
                1 => (Op::Ret, 1, 0),
                3 => (Op::Illegal, 1, 0),
                5 => (Op::Pchl, 1, 0),
                _ => (Op::Sphl, 1, 0),
            },
            2 => (Op::Jcc, 3, 0),
            3 => match y {
                0 => (Op::Jmp, 3, 0),
                2 => (Op::Out, 2, 0),
                3 => (Op::In, 2, 0),
                4 => (Op::Xthl, 1, 0),
                5 => (Op::Xchg, 1, 0),
                6 => (Op::Di, 1, 0),
                7 => (Op::Ei, 1, 0),
                _ => (Op::Illegal, 1, 0),
            },
            4 => (Op::Ccc, 3, 0),
            5 => match y {
                0 | 2 | 4 | 6 => (Op::Push, 1, 0),
                1 => (Op::Call, 3, 0),
                _ => (Op::Illegal, 1, 0),
            },
            6 => (Op::AluImm, 2, ALL),
            _ => (Op::Rst, 1, 0),
        },
    }
}
