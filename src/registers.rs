use serde::{Deserialize, Serialize};

/// The SIC/XE general-purpose registers, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Register {
    A = 0,
    X = 1,
    L = 2,
    B = 3,
    S = 4,
    T = 5,
    F = 6,
}

impl Register {
    pub const COUNT: usize = 7;

    /// Register from its encoded number (format-2 register fields).
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Register::A,
            1 => Register::X,
            2 => Register::L,
            3 => Register::B,
            4 => Register::S,
            5 => Register::T,
            6 => Register::F,
            _ => return None,
        })
    }

    /// Register from its mnemonic letter (the `?` in an `LD?` instruction).
    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'A' => Register::A,
            'X' => Register::X,
            'L' => Register::L,
            'B' => Register::B,
            'S' => Register::S,
            'T' => Register::T,
            'F' => Register::F,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::X => "X",
            Register::L => "L",
            Register::B => "B",
            Register::S => "S",
            Register::T => "T",
            Register::F => "F",
        }
    }
}

/// Tracked register values for one disassembly run. Only X and B feed back
/// into address resolution; the rest are tracked for uniformity. This is
/// decode bookkeeping, not execution: only register loads and CLEAR touch it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterFile {
    values: [i32; Register::COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.values = [0; Register::COUNT];
    }

    pub fn get(&self, r: Register) -> i32 {
        self.values[r as usize]
    }

    pub fn set(&mut self, r: Register, value: i32) {
        self.values[r as usize] = value;
    }

    pub fn clear(&mut self, r: Register) {
        self.set(r, 0);
    }
}
