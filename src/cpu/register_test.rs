use pretty_assertions::assert_eq;

use crate::cpu::register::{RegisterState, R, AMode, get_register, sr};
use crate::memory::MMU;

#[test]
fn can_access_gpr_halves() {
    let mut mmu = MMU::default();
    let mut r = RegisterState::default();
    r.set(&mut mmu, R::AX, 0x1234);
    r.set(&mut mmu, R::AL, 0xFF);
    assert_eq!(0x12FF, r.get(&mmu, R::AX));
    assert_eq!(0x12, r.get(&mmu, R::AH));
    assert_eq!(0xFF, r.get(&mmu, R::AL));

    r.set(&mut mmu, R::AH, 0x5678);
    assert_eq!(0x78FF, r.get(&mmu, R::AX));

    r.set(&mut mmu, R::CX, 0xABCD);
    assert_eq!(0xCD, r.get(&mmu, R::CL));
    assert_eq!(0xAB, r.get(&mmu, R::CH));
    assert_eq!(0x78FF, r.get(&mmu, R::AX));
}

#[test]
fn halves_map_to_their_parent() {
    let mut mmu = MMU::default();
    let mut r = RegisterState::default();
    r.set(&mut mmu, R::BL, 0x01);
    r.set(&mut mmu, R::DH, 0x02);
    assert_eq!(0x0001, r.get(&mmu, R::BX));
    assert_eq!(0x0200, r.get(&mmu, R::DX));
    assert_eq!(0, r.get(&mmu, R::SP));
}

#[test]
fn segment_registers_live_in_memory() {
    let mut mmu = MMU::default();
    let mut r = RegisterState::with_windows([0x200, 0x202, 0x204, 0x206]);
    r.set(&mut mmu, R::DS, 0xBEEF);
    assert_eq!(0xBEEF, r.get(&mmu, R::DS));
    assert_eq!(0xBEEF, mmu.read_u16(0x206));
    assert_eq!(0, r.get(&mmu, R::ES));

    mmu.write_u16(0x202, 0x1111);
    assert_eq!(0x1111, r.get(&mmu, R::CS));

    r.reset(&mut mmu);
    assert_eq!(0, r.get(&mmu, R::CS));
    assert_eq!(0, r.get(&mmu, R::DS));
}

#[test]
fn decodes_register_fields() {
    assert_eq!(R::AL, get_register(0, false));
    assert_eq!(R::BH, get_register(7, false));
    assert_eq!(R::SP, get_register(4, true));
    assert_eq!(R::DS, sr(3u8));
    assert_eq!(R::ES, sr(0u8));
}

#[test]
fn amode_matches_isa_table() {
    assert_eq!((R::BX, Some(R::SI)), AMode::from_rm(0).registers());
    assert_eq!((R::BP, Some(R::DI)), AMode::from_rm(3).registers());
    assert_eq!((R::BP, None), AMode::from_rm(6).registers());
    assert_eq!((R::BX, None), AMode::from_rm(7).registers());
    assert_eq!("bp + si", format!("{}", AMode::BPSI));
}
