use pretty_assertions::assert_eq;

use crate::cpu::{Decoder, ByteCursor, Op, Parameter, R, AMode, InstructionFlags};
use crate::error::DecodeError;
use crate::memory::MMU;

fn disasm(code: &[u8]) -> String {
    let decoder = Decoder::default();
    let lines: Vec<String> = decoder.decode_to_block(code, 0)
        .into_iter()
        .map(|op| match op {
            Ok(info) => info.instruction.to_string(),
            Err(e) => e.to_string(),
        })
        .collect();
    lines.join("\n")
}

#[test]
fn can_decode_mov_imm16() {
    let op = Decoder::default().decode_bytes(&[0xB8, 0x01, 0x00], 0).unwrap();
    assert_eq!(Op::Mov, op.command);
    assert_eq!(Parameter::Reg(R::AX), op.params.dst);
    assert_eq!(Parameter::Imm(1), op.params.src);
    assert_eq!(3, op.length);
    assert_eq!(true, op.is_wide());
}

#[test]
fn can_decode_add_bp_with_zero_displacement() {
    // mod=1 with a displacement byte of 0 still consumes the byte
    let op = Decoder::default().decode_bytes(&[0x03, 0x46, 0x00], 0).unwrap();
    assert_eq!(Op::Add, op.command);
    assert_eq!(Parameter::Reg(R::AX), op.params.dst);
    assert_eq!(Parameter::Ptr(Some(AMode::BP), 0), op.params.src);
    assert_eq!(3, op.length);
    assert_eq!("add ax, [bp]", op.to_string());
}

#[test]
fn can_decode_short_jump() {
    let op = Decoder::default().decode_bytes(&[0x75, 0xFE], 0x10).unwrap();
    assert_eq!(Op::Jnz, op.command);
    assert_eq!(Parameter::Rel(-2), op.params.dst);
    assert_eq!(2, op.length);
    assert_eq!(0x10, op.offset);
    assert_eq!("jnz $+0", op.to_string());
}

#[test]
fn mod_3_never_yields_an_address() {
    let decoder = Decoder::default();
    for reg in 0..8u8 {
        for rm in 0..8u8 {
            let modrm = 0b1100_0000 | reg << 3 | rm;
            for &opcode in &[0x00u8, 0x01, 0x02, 0x03, 0x88, 0x89, 0x8A, 0x8B, 0x86, 0x87] {
                let op = decoder.decode_bytes(&[opcode, modrm], 0).unwrap();
                assert_eq!(2, op.length);
                assert_eq!(true, op.params.dst.is_reg());
                assert_eq!(true, op.params.src.is_reg());
            }
        }
    }
}

#[test]
fn mod_0_rm_6_is_a_direct_address() {
    let decoder = Decoder::default();
    for reg in 0..8u8 {
        let modrm = reg << 3 | 6;
        let op = decoder.decode_bytes(&[0x8B, modrm, 0x82, 0x0D], 0).unwrap();
        assert_eq!(4, op.length);
        assert_eq!(Parameter::Ptr(None, 0x0D82), op.params.src);
    }
    let op = decoder.decode_bytes(&[0x8B, 0x2E, 0x05, 0x00], 0).unwrap();
    assert_eq!("mov bp, [5]", op.to_string());
}

#[test]
fn can_disassemble_register_and_memory_moves() {
    let code: Vec<u8> = vec![
        0x89, 0xD9,             // mov cx, bx
        0xB1, 0x0C,             // mov cl, 12
        0xB5, 0xF4,             // mov ch, 244
        0xB9, 0x0C, 0x00,       // mov cx, 12
        0xB9, 0xF4, 0xFF,       // mov cx, 65524
        0x8A, 0x00,             // mov al, [bx + si]
        0x8B, 0x1B,             // mov bx, [bp + di]
        0x8A, 0x60, 0x04,       // mov ah, [bx + si + 4]
        0x8A, 0x80, 0x87, 0x13, // mov al, [bx + si + 4999]
        0x89, 0x09,             // mov [bx + di], cx
        0x88, 0x6E, 0x00,       // mov [bp], ch
    ];
    assert_eq!("mov cx, bx
mov cl, 12
mov ch, 244
mov cx, 12
mov cx, 65524
mov al, [bx + si]
mov bx, [bp + di]
mov ah, [bx + si + 4]
mov al, [bx + si + 4999]
mov [bx + di], cx
mov [bp], ch", disasm(&code));
}

#[test]
fn can_disassemble_signed_displacements_and_sizes() {
    let code: Vec<u8> = vec![
        0x8B, 0x41, 0xDB,                   // mov ax, [bx + di - 37]
        0x89, 0x8C, 0xD4, 0xFE,             // mov [si - 300], cx
        0xC6, 0x03, 0x07,                   // mov byte [bp + di], 7
        0xC7, 0x85, 0x85, 0x03, 0x5B, 0x01, // mov word [di + 901], 347
        0xA1, 0xFB, 0x09,                   // mov ax, [2555]
        0xA3, 0x0F, 0x00,                   // mov [15], ax
        0x8B, 0x1E, 0x00, 0x80,             // mov bx, [32768]
    ];
    assert_eq!("mov ax, [bx + di - 37]
mov [si - 300], cx
mov byte [bp + di], 7
mov word [di + 901], 347
mov ax, [2555]
mov [15], ax
mov bx, [32768]", disasm(&code));
}

#[test]
fn can_disassemble_arithmetic() {
    let code: Vec<u8> = vec![
        0x03, 0x18,                   // add bx, [bx + si]
        0x83, 0xC6, 0x02,             // add si, 2
        0x83, 0xC7, 0xC6,             // add di, -58
        0x05, 0xE8, 0x03,             // add ax, 1000
        0x04, 0xE2,                   // add al, 226
        0x2C, 0x09,                   // sub al, 9
        0x29, 0xD8,                   // sub ax, bx
        0x3D, 0xE8, 0x03,             // cmp ax, 1000
        0x80, 0x3E, 0xE2, 0x12, 0x1D, // cmp byte [4834], 29
        0x81, 0x2E, 0x00, 0x10, 0x00, 0x01, // sub word [4096], 256
        0x82, 0xC1, 0xFF,             // add cl, -1
    ];
    assert_eq!("add bx, [bx + si]
add si, 2
add di, -58
add ax, 1000
add al, 226
sub al, 9
sub ax, bx
cmp ax, 1000
cmp byte [4834], 29
sub word [4096], 256
add cl, -1", disasm(&code));
}

#[test]
fn can_disassemble_stack_and_exchange() {
    let code: Vec<u8> = vec![
        0x50,             // push ax
        0x5B,             // pop bx
        0x1E,             // push ds
        0x07,             // pop es
        0x0E,             // push cs
        0xFF, 0x36, 0x10, 0x00, // push word [16]
        0x8F, 0x47, 0x02, // pop word [bx + 2]
        0x91,             // xchg ax, cx
        0x87, 0xCA,       // xchg cx, dx
        0x86, 0x07,       // xchg al, [bx]
        0x8E, 0xD8,       // mov ds, ax
        0x8C, 0xC1,       // mov cx, es
        0x40,             // inc ax
        0x4F,             // dec di
        0xFE, 0xC1,       // inc cl
        0xFF, 0x0E, 0x00, 0x02, // dec word [512]
        0xCC,             // int3
    ];
    assert_eq!("push ax
pop bx
push ds
pop es
push cs
push word [16]
pop word [bx + 2]
xchg ax, cx
xchg cx, dx
xchg al, [bx]
mov ds, ax
mov cx, es
inc ax
dec di
inc cl
dec word [512]
int3", disasm(&code));
}

#[test]
fn can_disassemble_relative_short_jumps() {
    let code: Vec<u8> = vec![
        0x74, 0x04, // je $+6
        0x7C, 0xFE, // jl $+0
        0x7F, 0xFA, // jg $-4
        0xE2, 0xFC, // loop $-2
        0xE1, 0xF8, // loopz $-6
        0xE0, 0x00, // loopnz $+2
        0xE3, 0xF2, // jcxz $-12
    ];
    assert_eq!("je $+6
jl $+0
jg $-4
loop $-2
loopz $-6
loopnz $+2
jcxz $-12", disasm(&code));
}

#[test]
fn can_render_listing_with_bytes() {
    let code: Vec<u8> = vec![
        0xB8, 0x01, 0x00, // mov ax, 1
        0x03, 0x46, 0x00, // add ax, [bp]
        0x75, 0xFE,       // jnz $+0
        0x0F,             // unknown
    ];
    let res = Decoder::default().disassemble_block_to_str(&code, 0x100);
    assert_eq!("[0100] B80100       mov ax, 1
[0103] 034600       add ax, [bp]
[0106] 75FE         jnz $+0
;;; ERROR: unrecognized opcode 0F (00001111) at offset 0108", res);
}

#[test]
fn lengths_chain_to_the_next_instruction() {
    let code: Vec<u8> = vec![
        0xC7, 0x85, 0x85, 0x03, 0x5B, 0x01,
        0x80, 0x3E, 0xE2, 0x12, 0x1D,
        0x8B, 0x41, 0xDB,
        0x50,
        0x75, 0xFE,
    ];
    let decoder = Decoder::default();
    let mut c = ByteCursor::new(&code);
    let mut total = 0;
    let mut lengths = Vec::new();
    while c.remaining() > 0 {
        let before = c.position();
        let op = decoder.decode(&mut c).unwrap();
        assert_eq!(c.position() - before, op.length as usize);
        assert_eq!(before, op.offset as usize);

        // decoding the same window again yields the same instruction
        assert_eq!(op, decoder.decode_bytes(&code[before..], before as u16).unwrap());

        total += op.length as usize;
        lengths.push(op.length);
    }
    assert_eq!(code.len(), total);
    assert_eq!(vec![6, 5, 3, 1, 2], lengths);
}

#[test]
fn truncated_instruction_is_an_underflow() {
    let decoder = Decoder::default();
    assert_eq!(Err(DecodeError::StreamUnderflow(1)), decoder.decode_bytes(&[0x03], 0));
    assert_eq!(Err(DecodeError::StreamUnderflow(4)), decoder.decode_bytes(&[0xB8, 0x01], 0x02));
    assert_eq!(Err(DecodeError::StreamUnderflow(0)), decoder.decode_bytes(&[], 0));
    assert_eq!(Err(DecodeError::StreamUnderflow(4)), decoder.decode_bytes(&[0xC7, 0x06, 0x00, 0x10], 0));
}

#[test]
fn unknown_opcode_and_extension_are_errors() {
    let decoder = Decoder::default();
    let err = decoder.decode_bytes(&[0xF4], 0x20).unwrap_err();
    assert_eq!(DecodeError::UnknownOpcode(0x20, 0xF4), err);
    assert_eq!("ERROR: unrecognized opcode F4 (11110100) at offset 0020", err.to_string());

    // or r/m8, imm8 is outside the subset
    assert_eq!(Err(DecodeError::UnknownExtension(0, 0x80, 1)), decoder.decode_bytes(&[0x80, 0xC8, 0x01], 0));

    // push r/m8 does not exist
    assert_eq!(Err(DecodeError::UnknownExtension(0, 0xFE, 6)), decoder.decode_bytes(&[0xFE, 0x30], 0));

    // segment register field out of range
    assert_eq!(Err(DecodeError::UnknownExtension(0, 0x8E, 4)), decoder.decode_bytes(&[0x8E, 0xE0], 0));
}

#[test]
fn sets_instruction_flags() {
    let decoder = Decoder::default();
    let op = decoder.decode_bytes(&[0x83, 0xC7, 0xC6], 0).unwrap();
    assert_eq!(InstructionFlags::WIDE | InstructionFlags::SIGN_EXTEND, op.flags);
    assert_eq!(Parameter::Imm(0xFFC6), op.params.src);

    let op = decoder.decode_bytes(&[0xC6, 0x03, 0x07], 0).unwrap();
    assert_eq!(InstructionFlags::SPECIFY_SIZE, op.flags);

    let op = decoder.decode_bytes(&[0x1E], 0).unwrap();
    assert_eq!(InstructionFlags::WIDE, op.flags);
}

#[test]
fn reads_instructions_from_memory_up_to_an_end() {
    let mut mmu = MMU::default();
    mmu.write(0x10, &[0xB8, 0x01, 0x00, 0xCC]);
    let decoder = Decoder::default();
    assert_eq!("mov ax, 1", decoder.get_instruction(&mmu, 0x10, 0x14).unwrap().to_string());
    assert_eq!(Err(DecodeError::StreamUnderflow(0x12)), decoder.get_instruction(&mmu, 0x10, 0x12));
    assert_eq!(Err(DecodeError::StreamUnderflow(0x10)), decoder.get_instruction(&mmu, 0x10, 0x08));
}
