#![allow(dead_code)]

use peg_engine::{CacheId, Parser, ParserConfig, Semantics, StrSource, Terminal};
use tracing_subscriber::EnvFilter;

/// Procedures for
///
/// ```text
/// Sum    = Number ("+" Number / "-" Number)* !_
/// Number = [0-9]+
/// ```
///
/// written the way a generator emits them, with `Number` memoized.
pub struct SumGrammar {
    number: CacheId,
}

impl SumGrammar {
    pub fn new(p: &mut Parser<'_, i64>) -> Self {
        SumGrammar {
            number: p.add_cache("Number", "Number"),
        }
    }

    // Sum = Number ("+" Number / "-" Number)* !_
    pub fn sum(&self, p: &mut Parser<'_, i64>) -> bool {
        p.begin("Sum");
        if !self.number(p) {
            return p.reject();
        }
        while self.sum_0(p) {}
        if !p.next(Terminal::End) {
            return p.reject();
        }
        p.accept()
    }

    // "+" Number / "-" Number
    fn sum_0(&self, p: &mut Parser<'_, i64>) -> bool {
        p.begin_inner("Sum_0");
        if self.sum_1(p) {
            return p.accept_inner();
        }
        if self.sum_2(p) {
            return p.accept_inner();
        }
        p.reject_inner()
    }

    // "+" Number
    fn sum_1(&self, p: &mut Parser<'_, i64>) -> bool {
        p.begin_inner("Sum_1");
        if !p.next(Terminal::Char('+')) {
            return p.reject_inner();
        }
        if !self.number(p) {
            return p.reject_inner();
        }
        p.accept_inner()
    }

    // "-" Number
    fn sum_2(&self, p: &mut Parser<'_, i64>) -> bool {
        p.begin_inner("Sum_2");
        if !p.next(Terminal::Char('-')) {
            return p.reject_inner();
        }
        if !self.number(p) {
            return p.reject_inner();
        }
        p.accept_inner()
    }

    // Number = [0-9]+
    pub fn number(&self, p: &mut Parser<'_, i64>) -> bool {
        if p.saved(self.number) {
            return p.reuse();
        }
        if !p.next(Terminal::InRange('0', '9')) {
            return p.reject();
        }
        while p.next(Terminal::InRange('0', '9')) {}
        p.accept()
    }
}

pub fn sum_semantics() -> Semantics<i64> {
    Semantics::<i64>::new()
        .on("Number", |rule| {
            let value = rule.text().parse().unwrap_or(0);
            rule.put(value);
        })
        .on("Sum", |rule| {
            let n = rule.rhs_size();
            let mut total = rule.rhs(0).get().copied().unwrap_or(0);
            let mut i = 1;
            while i + 1 < n {
                let operand = rule.rhs(i + 1).get().copied().unwrap_or(0);
                if rule.rhs_text(i, i + 1) == "+" {
                    total += operand;
                } else {
                    total -= operand;
                }
                i += 2;
            }
            rule.put(total);
        })
}

/// Send parser events to the test output; `RUST_LOG=peg_engine=trace`
/// shows every phrase.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse `input` as a `Sum`, returning its value or the error report.
pub fn eval_sum(input: &str, memo: usize) -> Result<i64, String> {
    init_tracing();
    let semantics = sum_semantics();
    let source = StrSource::new(input);
    let config = ParserConfig::with_memo(memo).expect("valid memo capacity");
    let mut parser = Parser::new(&source, &semantics, config);
    let grammar = SumGrammar::new(&mut parser);
    match parser.parse(|p| grammar.sum(p)) {
        Ok(tree) => Ok(tree.get().copied().unwrap_or(0)),
        Err(err) => Err(err.to_string()),
    }
}
