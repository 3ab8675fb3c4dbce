//! Parse throughput of a small arithmetic grammar at each memo capacity.
//!
//! Every rule is memoized, and each alternative re-parses its shared
//! prefix, so capacity 0 shows the cost of pure backtracking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use peg_engine::{CacheId, Parser, ParserConfig, Semantics, StrSource, Terminal, MAX_MEMO};

/// ```text
/// Expr      = Additive "=" Expr / Additive
/// Additive  = Multitive "+" Additive / Multitive
/// Multitive = Atom "*" Multitive / Atom
/// Atom      = [0-9]+ / "(" Expr ")"
/// ```
struct Arith {
    expr: CacheId,
    additive: CacheId,
    multitive: CacheId,
    atom: CacheId,
}

type Rule = fn(&Arith, &mut Parser<'_, ()>) -> bool;

impl Arith {
    fn new(p: &mut Parser<'_, ()>) -> Self {
        Arith {
            expr: p.add_cache("Expr", "Expr"),
            additive: p.add_cache("Additive", "Additive"),
            multitive: p.add_cache("Multitive", "Multitive"),
            atom: p.add_cache("Atom", "Atom"),
        }
    }

    // Rule = Operand op Rule / Operand
    fn binary(&self, p: &mut Parser<'_, ()>, cache: CacheId, operand: Rule, op: char, this: Rule) -> bool {
        if p.saved(cache) {
            return p.reuse();
        }
        p.begin_inner("binary");
        let first = operand(self, p) && p.next(Terminal::Char(op)) && this(self, p);
        let first = if first { p.accept_inner() } else { p.reject_inner() };
        if first || operand(self, p) {
            return p.accept();
        }
        p.reject()
    }

    fn expr(&self, p: &mut Parser<'_, ()>) -> bool {
        self.binary(p, self.expr, Arith::additive, '=', Arith::expr)
    }

    fn additive(&self, p: &mut Parser<'_, ()>) -> bool {
        self.binary(p, self.additive, Arith::multitive, '+', Arith::additive)
    }

    fn multitive(&self, p: &mut Parser<'_, ()>) -> bool {
        self.binary(p, self.multitive, Arith::atom, '*', Arith::multitive)
    }

    fn atom(&self, p: &mut Parser<'_, ()>) -> bool {
        if p.saved(self.atom) {
            return p.reuse();
        }
        if p.next(Terminal::InRange('0', '9')) {
            while p.next(Terminal::InRange('0', '9')) {}
            return p.accept();
        }
        p.begin_inner("group");
        if p.next(Terminal::Char('(')) && self.expr(p) && p.next(Terminal::Char(')')) {
            p.accept_inner();
            return p.accept();
        }
        p.reject_inner();
        p.reject()
    }
}

fn parse(input: &str, memo: usize) -> bool {
    let semantics = Semantics::new();
    let source = StrSource::new(input);
    let config = ParserConfig::with_memo(memo).unwrap();
    let mut parser = Parser::new(&source, &semantics, config);
    let grammar = Arith::new(&mut parser);
    parser.parse(|p| grammar.expr(p)).is_ok()
}

fn bench_memo_capacity(c: &mut Criterion) {
    let input = "1+2+3+4*5*6*(7*8+(0*1*2+1))=21+(3*(4+5))";
    let mut group = c.benchmark_group("arith");
    group.throughput(Throughput::Bytes(input.len() as u64));
    for memo in [0, 1, 3, MAX_MEMO] {
        group.bench_with_input(BenchmarkId::new("memo", memo), &memo, |b, &memo| {
            b.iter(|| assert!(parse(black_box(input), memo)));
        });
    }
    group.finish();
}

fn bench_error_report(c: &mut Criterion) {
    // The outer group is never closed, so every alternative fails.
    let input = "(1+2+3+4*5*6*(7*8+(0*1*2+1))=21";
    c.bench_function("arith_error", |b| {
        b.iter(|| assert!(!parse(black_box(input), 3)));
    });
}

criterion_group!(benches, bench_memo_capacity, bench_error_report);
criterion_main!(benches);
