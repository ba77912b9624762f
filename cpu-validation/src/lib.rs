use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use invaders_core::core::{Bus, ProtectedWrite};
use invaders_core::cpu::i8080::{Flags, I8080, OPCODES, Op};
use rand::Rng;
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
    PortRead,
    PortWrite,
}

impl BusOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BusOp::Read => "read",
            BusOp::Write => "write",
            BusOp::PortRead => "in",
            BusOp::PortWrite => "out",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    /// Value returned by IN for each port; unlisted ports float high.
    pub port_inputs: HashMap<u16, u8>,
    pub cycles: Vec<BusCycle>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            port_inputs: HashMap::new(),
            cycles: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }

    /// Every memory address touched so far, in order, without repeats.
    pub fn touched_addresses(&self) -> Vec<u16> {
        let mut seen = BTreeMap::new();
        for (i, c) in self.cycles.iter().enumerate() {
            if matches!(c.op, BusOp::Read | BusOp::Write) {
                seen.entry(c.addr).or_insert(i);
            }
        }
        let mut addrs: Vec<_> = seen.into_iter().collect();
        addrs.sort_by_key(|&(_, first)| first);
        addrs.into_iter().map(|(addr, _)| addr).collect()
    }

    /// Port traffic in the JSON vector format.
    pub fn port_log(&self) -> Vec<(u16, u8, String)> {
        self.cycles
            .iter()
            .filter(|c| matches!(c.op, BusOp::PortRead | BusOp::PortWrite))
            .map(|c| (c.addr, c.data, c.op.as_str().to_string()))
            .collect()
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) -> Result<(), ProtectedWrite> {
        self.memory[addr as usize] = data;
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
        Ok(())
    }

    fn io_read(&mut self, port: u16) -> u8 {
        let data = self.port_inputs.get(&port).copied().unwrap_or(0xFF);
        self.cycles.push(BusCycle {
            addr: port,
            data,
            op: BusOp::PortRead,
        });
        data
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.cycles.push(BusCycle {
            addr: port,
            data,
            op: BusOp::PortWrite,
        });
    }
}

// --- I8080 JSON test vector types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I8080TestCase {
    pub name: String,
    pub initial: I8080CpuState,
    #[serde(rename = "final")]
    pub final_state: I8080CpuState,
    pub cycles: u32,
    /// (port, data, "in" | "out") in execution order.
    #[serde(default)]
    pub ports: Vec<(u16, u8, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I8080CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    /// Packed flags (S Z 0 AC 0 P 1 CY).
    pub f: u8,
    #[serde(default)]
    pub inte: bool,
    #[serde(default)]
    pub halted: bool,
    pub ram: Vec<(u16, u8)>,
}

impl I8080CpuState {
    fn capture(cpu: &I8080, ram: Vec<(u16, u8)>) -> Self {
        Self {
            pc: cpu.pc,
            sp: cpu.sp,
            a: cpu.a,
            b: cpu.b,
            c: cpu.c,
            d: cpu.d,
            e: cpu.e,
            h: cpu.h,
            l: cpu.l,
            f: cpu.flags.pack(),
            inte: cpu.interrupts_enabled,
            halted: cpu.halted,
            ram,
        }
    }

    /// Build a CPU in this state.
    pub fn to_cpu(&self) -> I8080 {
        let mut cpu = I8080::new();
        cpu.pc = self.pc;
        cpu.sp = self.sp;
        cpu.a = self.a;
        cpu.b = self.b;
        cpu.c = self.c;
        cpu.d = self.d;
        cpu.e = self.e;
        cpu.h = self.h;
        cpu.l = self.l;
        cpu.flags = Flags::unpack(self.f);
        cpu.interrupts_enabled = self.inte;
        cpu.halted = self.halted;
        cpu
    }
}

// --- Generation ---

/// Opcodes with a handler, in ascending order.
pub fn legal_opcodes() -> Vec<u8> {
    (0..=255u8)
        .filter(|&op| OPCODES[op as usize].op != Op::Illegal)
        .collect()
}

/// Random register file and memory, `opcode` at PC, one step recorded.
///
/// Generated cases describe the emulator's own behaviour; they pin it down
/// against regressions rather than prove it against silicon.
pub fn generate_case(rng: &mut impl Rng, opcode: u8, index: usize) -> Result<I8080TestCase, String> {
    let mut bus = TracingBus::new();
    rng.fill(&mut bus.memory[..]);

    let mut cpu = I8080::new();
    cpu.pc = rng.r#gen();
    cpu.sp = rng.r#gen();
    cpu.a = rng.r#gen();
    cpu.b = rng.r#gen();
    cpu.c = rng.r#gen();
    cpu.d = rng.r#gen();
    cpu.e = rng.r#gen();
    cpu.h = rng.r#gen();
    cpu.l = rng.r#gen();
    cpu.flags = Flags::unpack(rng.r#gen());
    cpu.interrupts_enabled = rng.gen_bool(0.5);

    bus.memory[cpu.pc as usize] = opcode;
    if OPCODES[opcode as usize].op == Op::In {
        let port = bus.memory[cpu.pc.wrapping_add(1) as usize] as u16;
        bus.port_inputs.insert(port, rng.r#gen());
    }

    let pre_memory = bus.memory;
    let initial_cpu = cpu.clone();

    let cycles = cpu
        .step(&mut bus)
        .map_err(|e| format!("opcode 0x{opcode:02X}: {e}"))?;

    let touched = bus.touched_addresses();
    let initial_ram = touched.iter().map(|&a| (a, pre_memory[a as usize])).collect();
    let final_ram = touched.iter().map(|&a| (a, bus.memory[a as usize])).collect();

    Ok(I8080TestCase {
        name: format!("{opcode:02x} {index:04}"),
        initial: I8080CpuState::capture(&initial_cpu, initial_ram),
        final_state: I8080CpuState::capture(&cpu, final_ram),
        cycles,
        ports: bus.port_log(),
    })
}

pub fn generate_cases(rng: &mut impl Rng, opcode: u8, count: usize) -> Result<Vec<I8080TestCase>, String> {
    (0..count).map(|i| generate_case(rng, opcode, i)).collect()
}

// --- Replay ---

/// Execute one case and compare every recorded field.
pub fn run_case(tc: &I8080TestCase) -> Result<(), String> {
    let mut cpu = tc.initial.to_cpu();
    let mut bus = TracingBus::new();
    for &(addr, val) in &tc.initial.ram {
        bus.memory[addr as usize] = val;
    }
    for (port, data, op) in &tc.ports {
        if op == BusOp::PortRead.as_str() {
            bus.port_inputs.insert(*port, *data);
        }
    }

    let cycles = cpu.step(&mut bus).map_err(|e| format!("{}: {e}", tc.name))?;

    let expected = &tc.final_state;
    let actual = I8080CpuState::capture(&cpu, Vec::new());
    let registers = [
        ("PC", actual.pc, expected.pc),
        ("SP", actual.sp, expected.sp),
        ("A", actual.a as u16, expected.a as u16),
        ("B", actual.b as u16, expected.b as u16),
        ("C", actual.c as u16, expected.c as u16),
        ("D", actual.d as u16, expected.d as u16),
        ("E", actual.e as u16, expected.e as u16),
        ("H", actual.h as u16, expected.h as u16),
        ("L", actual.l as u16, expected.l as u16),
        ("F", actual.f as u16, expected.f as u16),
    ];
    for (reg, got, want) in registers {
        if got != want {
            return Err(format!("{}: {reg} got 0x{got:04X} expected 0x{want:04X}", tc.name));
        }
    }
    if actual.inte != expected.inte {
        return Err(format!("{}: INTE got {} expected {}", tc.name, actual.inte, expected.inte));
    }
    if actual.halted != expected.halted {
        return Err(format!("{}: halted got {} expected {}", tc.name, actual.halted, expected.halted));
    }

    for &(addr, want) in &expected.ram {
        let got = bus.memory[addr as usize];
        if got != want {
            return Err(format!("{}: RAM[0x{addr:04X}] got 0x{got:02X} expected 0x{want:02X}", tc.name));
        }
    }

    if cycles != tc.cycles {
        return Err(format!("{}: cycles got {cycles} expected {}", tc.name, tc.cycles));
    }

    let ports = bus.port_log();
    if ports != tc.ports {
        return Err(format!("{}: port traffic got {ports:?} expected {:?}", tc.name, tc.ports));
    }
    Ok(())
}

// --- Files ---

/// Read a vector file, gunzipping `.gz` files on the way.
pub fn load_test_file(path: &Path) -> Result<Vec<I8080TestCase>, String> {
    let raw = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let json = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut out = String::new();
        GzDecoder::new(&raw[..])
            .read_to_string(&mut out)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        out
    } else {
        String::from_utf8(raw).map_err(|e| format!("{}: {e}", path.display()))?
    };
    serde_json::from_str(&json).map_err(|e| format!("{}: {e}", path.display()))
}
