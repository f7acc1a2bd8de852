#[macro_use]
extern crate criterion;

use criterion::Criterion;

use sim86::cpu::Decoder;
use sim86::machine::{Machine, State};

fn exec_simple_loop(c: &mut Criterion) {
    let mut machine = Machine::default();
    let code: Vec<u8> = vec![
        0xB9, 0xFF, 0xFF, // mov cx, 65535
        0x49,             // dec cx
        0x75, 0xFD,       // jnz $-1
    ];
    machine.load(&code).unwrap();

    c.bench_function("execute small jnz loop", move |b| b.iter(|| {
        if machine.step().unwrap() == State::Halted {
            machine.reset();
        }
    }));
}

fn disasm_small_prog(c: &mut Criterion) {
    let code: Vec<u8> = vec![
        0x80, 0x3E, 0x31, 0x10, 0x00,   // cmp byte [4145], 0
        0xB9, 0xFF, 0xFF,               // mov cx, 65535
        0x49,                           // dec cx
        0x75, 0xFD,                     // jnz $-1
        0x83, 0xC7, 0x3A,               // add di, 58
        0xBB, 0x8F, 0x79,               // mov bx, 31119
        0x8B, 0x41, 0xDB,               // mov ax, [bx + di - 37]
        0xE2, 0xF0,                     // loop $-14
    ];
    let decoder = Decoder::default();

    c.bench_function("disasm small prog", move |b| b.iter(|| decoder.disassemble_block_to_str(&code, 0)));
}

criterion_group!(benches, exec_simple_loop, disasm_small_prog);
criterion_main!(benches);
