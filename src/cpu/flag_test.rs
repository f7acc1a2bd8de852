use pretty_assertions::assert_eq;

use crate::cpu::flag::{Flags, Flag, FlagEffect, FLAG_CF, FLAG_ZF, FLAG_OF};

#[test]
fn can_pack_unpack_flags() {
    let mut flags = Flags::default();
    assert_eq!(0x0000, flags.u16());
    flags.set_u16(0xFFFF);
    assert_eq!(0x0FD5, flags.u16());
    assert_eq!("CPAZSTIDO", flags.to_string());

    let flags = Flags::new_from_u16(FLAG_CF | FLAG_ZF | FLAG_OF);
    assert_eq!(true, flags.carry);
    assert_eq!(true, flags.zero);
    assert_eq!(true, flags.overflow);
    assert_eq!(false, flags.sign);
    assert_eq!("CZO", flags.to_string());
}

#[test]
fn add_to_zero() {
    // 0xFFFF + 1
    let f = Flags::from_add(0x1_0000, 0xFFFF, 1, true);
    assert_eq!(true, f.zero);
    assert_eq!(false, f.sign);
    assert_eq!(true, f.carry);
    assert_eq!(false, f.overflow);
    assert_eq!(true, f.adjust);
    assert_eq!(true, f.parity);
}

#[test]
fn add_across_signed_boundary() {
    // 0x7FFF + 1
    let f = Flags::from_add(0x8000, 0x7FFF, 1, true);
    assert_eq!(true, f.sign);
    assert_eq!(true, f.overflow);
    assert_eq!(false, f.carry);
    assert_eq!(false, f.zero);
}

#[test]
fn byte_add_uses_byte_width() {
    // 0x7F + 1 as bytes
    let f = Flags::from_add(0x80, 0x7F, 1, false);
    assert_eq!(true, f.sign);
    assert_eq!(true, f.overflow);
    assert_eq!(false, f.carry);

    // 0xFF + 1 as bytes
    let f = Flags::from_add(0x100, 0xFF, 1, false);
    assert_eq!(true, f.zero);
    assert_eq!(true, f.carry);
    assert_eq!(false, f.overflow);
}

#[test]
fn sub_borrow() {
    // 1 - 2
    let res = 1usize.wrapping_sub(2);
    let f = Flags::from_sub(res, 1, 2, true);
    assert_eq!(true, f.carry);
    assert_eq!(true, f.sign);
    assert_eq!(false, f.overflow);
    assert_eq!(true, f.adjust);

    // 0x8000 - 1
    let f = Flags::from_sub(0x7FFF, 0x8000, 1, true);
    assert_eq!(false, f.carry);
    assert_eq!(true, f.overflow);
    assert_eq!(false, f.sign);
}

#[test]
fn apply_respects_effect_kinds() {
    let mut flags = Flags::new_from_u16(FLAG_CF);
    let computed = Flags::new_from_u16(FLAG_ZF);
    flags.apply(&[
        (Flag::Zero, FlagEffect::Result),
        (Flag::Sign, FlagEffect::One),
        (Flag::Overflow, FlagEffect::Zero),
    ], &computed);
    assert_eq!("CZS", flags.to_string());
}
