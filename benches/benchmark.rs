use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use refa::compile;
use regex::Regex as LibRegex;

const PATTERNS: &[&str] = &[
    "(a|b)*abb",
    r"\d{4,4}-\d{2,2}-\d{2,2}",
    r".+@.+\..+",
    "foo(bar|baz)*qux",
    "[a-zA-Z0-9]+",
];

lazy_static! {
    static ref HAYSTACKS: Vec<String> = {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        (0..64)
            .map(|_| {
                let len = rng.gen_range(0..32);
                (0..len)
                    .map(|_| *b"abcdefgh0123456789".choose(&mut rng).unwrap() as char)
                    .collect()
            })
            .collect()
    };
}

pub fn regex_compile(c: &mut Criterion) {
    c.bench_function("refa compile", |b| {
        b.iter(|| {
            for pattern in PATTERNS {
                black_box(compile(black_box(pattern)).unwrap());
            }
        })
    });

    c.bench_function("library compile", |b| {
        b.iter(|| {
            for pattern in PATTERNS {
                black_box(LibRegex::new(black_box(pattern)).unwrap());
            }
        })
    });
}

pub fn regex_check(c: &mut Criterion) {
    let dfa = compile("[a-h]*(ab|cd)[0-9]{2,4}").unwrap();
    c.bench_function("refa check", |b| {
        b.iter(|| {
            HAYSTACKS
                .iter()
                .filter(|s| dfa.accepts(black_box(s.as_str())))
                .count()
        })
    });

    let lib = LibRegex::new("^(?:[a-h]*(ab|cd)[0-9]{2,4})$").unwrap();
    c.bench_function("library check", |b| {
        b.iter(|| {
            HAYSTACKS
                .iter()
                .filter(|s| lib.is_match(black_box(s.as_str())))
                .count()
        })
    });
}

criterion_group!(benches, regex_compile, regex_check);
criterion_main!(benches);
