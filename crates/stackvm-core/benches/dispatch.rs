//! Dispatch Loop Benchmarks
//!
//! Measures raw fetch-decode-execute throughput on small integer programs.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use stackvm_core::{Machine, Opcode, ProgramBuilder, Register};

/// Countdown loop: r0 = N; while r0 != 0 { r0 -= 1 }
fn countdown_program(iterations: i32) -> Vec<u8> {
    let head = ProgramBuilder::new().lea(Register::R0, iterations).push(0);
    let loop_start = head.len() as i32;
    head.pop()
        .push_reg(Register::R0)
        .push(1)
        .op(Opcode::Sub)
        .pop_reg(Register::R0)
        .push_reg(Register::R0)
        .jnz(loop_start)
        .halt()
        .build()
}

fn bench_countdown_loop(c: &mut Criterion) {
    let code = countdown_program(10_000);

    c.bench_function("countdown_loop_10k", |b| {
        b.iter(|| {
            let mut machine = Machine::new(black_box(&code));
            let _ = machine.execute();
            black_box(machine.register(Register::R0))
        })
    });
}

/// Straight-line arithmetic: push pairs and fold them with every binary operator
fn bench_straight_line_arithmetic(c: &mut Criterion) {
    let ops = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::And,
        Opcode::Or,
        Opcode::Shl,
        Opcode::Shr,
        Opcode::Cmp,
    ];

    let mut builder = ProgramBuilder::new().push(1);
    for i in 0..1_000 {
        builder = builder.push(i % 7 + 1).op(ops[i as usize % ops.len()]);
    }
    let code = builder.halt().build();

    c.bench_function("straight_line_arithmetic_1k", |b| {
        b.iter(|| {
            let mut machine = Machine::new(black_box(&code));
            let _ = machine.execute();
            black_box(machine.top())
        })
    });
}

criterion_group!(benches, bench_countdown_loop, bench_straight_line_arithmetic);
criterion_main!(benches);
