//! CPU flags register and condition evaluation.
//!
//! All condition and control state lives in a single 16-bit FLAGS word.
//! The four low bits form the condition-testable group that conditional
//! jumps consult; HALT is sticky and only a reset clears it. All bit
//! manipulation stays behind the methods here.

use serde::{Deserialize, Serialize};

/// The CPU flags bit-field.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags(u16);

impl Flags {
    /// Last result was zero.
    pub const ZERO: u16 = 1 << 0;
    /// Last result had bit 15 set.
    pub const NEGATIVE: u16 = 1 << 1;
    /// Last arithmetic result overflowed in signed two's complement.
    pub const OVERFLOW: u16 = 1 << 2;
    /// Last arithmetic result carried (or borrowed) out of 16 bits.
    pub const CARRY: u16 = 1 << 3;
    /// Reserved: never driven by any instruction.
    pub const BRANCH: u16 = 1 << 7;
    /// CPU is halted. Sticky until reset.
    pub const HALT: u16 = 1 << 8;
    /// Reserved: interrupt delivery is not modeled.
    pub const INTERRUPT: u16 = 1 << 15;

    /// The condition-testable group.
    pub const COND_MASK: u16 = Self::ZERO | Self::NEGATIVE | Self::OVERFLOW | Self::CARRY;

    /// All bits clear, the post-reset state.
    pub const fn empty() -> Self {
        Flags(0)
    }

    /// Raw register value, for dumps and snapshots.
    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 & Self::ZERO != 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 & Self::NEGATIVE != 0
    }

    pub const fn is_overflow(self) -> bool {
        self.0 & Self::OVERFLOW != 0
    }

    pub const fn is_carry(self) -> bool {
        self.0 & Self::CARRY != 0
    }

    pub const fn is_halted(self) -> bool {
        self.0 & Self::HALT != 0
    }

    /// Set the sticky HALT bit. There is no clearing counterpart;
    /// a halted CPU stays halted until reset.
    pub fn set_halt(&mut self) {
        self.0 |= Self::HALT;
    }

    fn assign(&mut self, mask: u16, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// Derive ZERO and NEGATIVE from a 16-bit result.
    pub fn update_zn(&mut self, result: u16) {
        self.assign(Self::ZERO, result == 0);
        self.assign(Self::NEGATIVE, result & 0x8000 != 0);
    }

    /// Derive CARRY and OVERFLOW from an addition.
    ///
    /// `wide` is the unsigned 32-bit sum of the operands; a carry means
    /// it did not fit in 16 bits. Overflow follows the sign rule: both
    /// operands share a sign bit that differs from the result's.
    pub fn update_arith_add(&mut self, wide: u32, op1: u16, op2: u16) {
        let result = wide as u16;
        self.assign(Self::CARRY, wide > 0xFFFF);
        self.assign(Self::OVERFLOW, (!(op1 ^ op2)) & (op1 ^ result) & 0x8000 != 0);
    }

    /// Derive CARRY and OVERFLOW from a subtraction.
    ///
    /// `wide` is `op1 - op2` computed with u32 wraparound, so CARRY is
    /// the borrow: set exactly when `op1 < op2` unsigned.
    pub fn update_arith_sub(&mut self, wide: u32, op1: u16, op2: u16) {
        let result = wide as u16;
        self.assign(Self::CARRY, wide > 0xFFFF);
        self.assign(Self::OVERFLOW, (op1 ^ op2) & (op1 ^ result) & 0x8000 != 0);
    }

    /// Letter rendering for dumps: uppercase bits are set.
    pub fn summary(self) -> String {
        let letter = |mask: u16, set: char, clear: char| {
            if self.0 & mask != 0 {
                set
            } else {
                clear
            }
        };
        [
            letter(Self::HALT, 'H', 'h'),
            letter(Self::CARRY, 'C', 'c'),
            letter(Self::OVERFLOW, 'V', 'v'),
            letter(Self::NEGATIVE, 'N', 'n'),
            letter(Self::ZERO, 'Z', 'z'),
        ]
        .iter()
        .collect()
    }
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Flags({:#06x} {})", self.0, self.summary())
    }
}

/// Condition selector for conditional jumps.
///
/// Codes 1-7 are the positive tests; `code + 8` is the logical negation
/// of `code`. Code 0 is unconditional and its bitwise pair, code 8, has
/// no assigned meaning: a jump through it is never taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cond {
    /// Code 0: always taken.
    Always,
    /// Code 1: equal (ZERO).
    Eq,
    /// Code 2: below, unsigned (CARRY).
    B,
    /// Code 3: below or equal, unsigned.
    Be,
    /// Code 4: less, signed (NEGATIVE xor OVERFLOW).
    L,
    /// Code 5: less or equal, signed.
    Le,
    /// Code 6: negative.
    N,
    /// Code 7: overflow.
    O,
    /// Code 8: undefined, never taken.
    Undefined,
    /// Code 9: not equal.
    Ne,
    /// Code 10: above or equal, unsigned.
    Ae,
    /// Code 11: above, unsigned.
    A,
    /// Code 12: greater or equal, signed.
    Ge,
    /// Code 13: greater, signed.
    G,
    /// Code 14: positive (not negative).
    P,
    /// Code 15: no overflow.
    No,
}

impl Cond {
    /// Decode a 4-bit condition code. Total: every nibble maps, with 8
    /// landing on `Undefined`.
    pub fn from_nibble(code: u8) -> Self {
        match code & 0x0F {
            0x0 => Cond::Always,
            0x1 => Cond::Eq,
            0x2 => Cond::B,
            0x3 => Cond::Be,
            0x4 => Cond::L,
            0x5 => Cond::Le,
            0x6 => Cond::N,
            0x7 => Cond::O,
            0x8 => Cond::Undefined,
            0x9 => Cond::Ne,
            0xA => Cond::Ae,
            0xB => Cond::A,
            0xC => Cond::Ge,
            0xD => Cond::G,
            0xE => Cond::P,
            _ => Cond::No,
        }
    }

    /// Re-encode to the 4-bit code.
    pub fn to_nibble(self) -> u8 {
        match self {
            Cond::Always => 0x0,
            Cond::Eq => 0x1,
            Cond::B => 0x2,
            Cond::Be => 0x3,
            Cond::L => 0x4,
            Cond::Le => 0x5,
            Cond::N => 0x6,
            Cond::O => 0x7,
            Cond::Undefined => 0x8,
            Cond::Ne => 0x9,
            Cond::Ae => 0xA,
            Cond::A => 0xB,
            Cond::Ge => 0xC,
            Cond::G => 0xD,
            Cond::P => 0xE,
            Cond::No => 0xF,
        }
    }

    /// Whether the condition holds against the current flags.
    /// `Undefined` never holds.
    pub fn holds(self, flags: Flags) -> bool {
        let less = flags.is_negative() != flags.is_overflow();
        match self {
            Cond::Always => true,
            Cond::Eq => flags.is_zero(),
            Cond::B => flags.is_carry(),
            Cond::Be => flags.is_carry() || flags.is_zero(),
            Cond::L => less,
            Cond::Le => less || flags.is_zero(),
            Cond::N => flags.is_negative(),
            Cond::O => flags.is_overflow(),
            Cond::Undefined => false,
            Cond::Ne => !flags.is_zero(),
            Cond::Ae => !flags.is_carry(),
            Cond::A => !(flags.is_carry() || flags.is_zero()),
            Cond::Ge => !less,
            Cond::G => !(less || flags.is_zero()),
            Cond::P => !flags.is_negative(),
            Cond::No => !flags.is_overflow(),
        }
    }

    /// Mnemonic suffix for disassembly; empty for the unconditional code.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Cond::Always => "",
            Cond::Eq => "EQ",
            Cond::B => "B",
            Cond::Be => "BE",
            Cond::L => "L",
            Cond::Le => "LE",
            Cond::N => "N",
            Cond::O => "O",
            Cond::Undefined => "??",
            Cond::Ne => "NE",
            Cond::Ae => "AE",
            Cond::A => "A",
            Cond::Ge => "GE",
            Cond::G => "G",
            Cond::P => "P",
            Cond::No => "NO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flags_with(bits: u16) -> Flags {
        let mut flags = Flags::empty();
        flags.assign(bits, true);
        flags
    }

    #[test]
    fn zn_cases() {
        let mut flags = Flags::empty();

        flags.update_zn(0);
        assert!(flags.is_zero());
        assert!(!flags.is_negative());

        flags.update_zn(0x8000);
        assert!(!flags.is_zero());
        assert!(flags.is_negative());

        flags.update_zn(0x7FFF);
        assert!(!flags.is_zero());
        assert!(!flags.is_negative());
    }

    #[test]
    fn add_signed_overflow_without_carry() {
        // 0x7FFF + 1 overflows signed but not unsigned
        let mut flags = Flags::empty();
        let wide = 0x7FFFu32 + 1;
        flags.update_zn(wide as u16);
        flags.update_arith_add(wide, 0x7FFF, 0x0001);
        assert!(flags.is_overflow());
        assert!(!flags.is_carry());
        assert!(flags.is_negative());
        assert!(!flags.is_zero());
    }

    #[test]
    fn add_carry_and_zero_without_overflow() {
        // 0xFFFF + 1 wraps to zero with a carry out
        let mut flags = Flags::empty();
        let wide = 0xFFFFu32 + 1;
        flags.update_zn(wide as u16);
        flags.update_arith_add(wide, 0xFFFF, 0x0001);
        assert!(flags.is_carry());
        assert!(flags.is_zero());
        assert!(!flags.is_overflow());
    }

    #[test]
    fn sub_borrow_is_carry() {
        // 3 - 5 borrows: CARRY set, no signed overflow
        let mut flags = Flags::empty();
        let wide = 3u32.wrapping_sub(5);
        flags.update_zn(wide as u16);
        flags.update_arith_sub(wide, 3, 5);
        assert!(flags.is_carry());
        assert!(!flags.is_overflow());
        assert!(flags.is_negative());
    }

    #[test]
    fn sub_signed_overflow() {
        // -32768 - 1 overflows signed
        let mut flags = Flags::empty();
        let wide = 0x8000u32.wrapping_sub(1);
        flags.update_zn(wide as u16);
        flags.update_arith_sub(wide, 0x8000, 0x0001);
        assert!(flags.is_overflow());
        assert!(!flags.is_carry());
        assert!(!flags.is_negative());
    }

    #[test]
    fn halt_is_sticky_across_updates() {
        let mut flags = Flags::empty();
        flags.set_halt();
        flags.update_zn(1);
        flags.update_arith_add(2, 1, 1);
        flags.update_arith_sub(0, 1, 1);
        assert!(flags.is_halted());
    }

    #[test]
    fn cond_truth_table() {
        let zero = flags_with(Flags::ZERO);
        let neg = flags_with(Flags::NEGATIVE);
        let none = Flags::empty();

        assert!(Cond::Always.holds(zero));
        assert!(Cond::Always.holds(none));
        assert!(Cond::Eq.holds(zero));
        assert!(!Cond::Eq.holds(none));
        assert!(Cond::N.holds(neg));
        assert!(!Cond::N.holds(none));
        assert!(Cond::P.holds(none));
        assert!(!Cond::P.holds(neg));
    }

    #[test]
    fn undefined_cond_never_holds() {
        for bits in [0, Flags::COND_MASK, Flags::ZERO, Flags::CARRY] {
            assert!(!Cond::Undefined.holds(flags_with(bits)));
        }
    }

    #[test]
    fn signed_less_is_neg_xor_overflow() {
        assert!(!Cond::L.holds(Flags::empty()));
        assert!(Cond::L.holds(flags_with(Flags::NEGATIVE)));
        assert!(Cond::L.holds(flags_with(Flags::OVERFLOW)));
        assert!(!Cond::L.holds(flags_with(Flags::NEGATIVE | Flags::OVERFLOW)));
    }

    proptest! {
        #[test]
        fn zn_tracks_result(value in any::<u16>()) {
            let mut flags = Flags::empty();
            flags.update_zn(value);
            prop_assert_eq!(flags.is_zero(), value == 0);
            prop_assert_eq!(flags.is_negative(), value & 0x8000 != 0);
        }

        #[test]
        fn high_codes_negate_low_codes(code in 1u8..8, bits in any::<u16>()) {
            let flags = flags_with(bits & Flags::COND_MASK);
            let test = Cond::from_nibble(code);
            let inverse = Cond::from_nibble(code + 8);
            prop_assert_eq!(test.holds(flags), !inverse.holds(flags));
        }

        #[test]
        fn cond_nibble_roundtrip(code in 0u8..16) {
            prop_assert_eq!(Cond::from_nibble(code).to_nibble(), code);
        }
    }
}
