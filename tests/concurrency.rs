mod common;

use common::{sum_semantics, SumGrammar};
use peg_engine::{Parser, ParserConfig, StrSource};

#[test]
fn independent_parsers_share_one_semantics() {
    let semantics = sum_semantics();
    let inputs: Vec<String> = (1..=8)
        .map(|n| (1..=n).map(|i| i.to_string()).collect::<Vec<_>>().join("+"))
        .collect();

    let results: Vec<Result<i64, String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let semantics = &semantics;
                scope.spawn(move || {
                    let source = StrSource::new(input.as_str());
                    let config = ParserConfig::with_memo(i % 4).unwrap();
                    let mut parser = Parser::new(&source, semantics, config);
                    let grammar = SumGrammar::new(&mut parser);
                    parser
                        .parse(|p| grammar.sum(p))
                        .map(|tree| tree.get().copied().unwrap_or(0))
                        .map_err(|e| e.to_string())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (n, result) in (1..=8i64).zip(results) {
        assert_eq!(result, Ok(n * (n + 1) / 2));
    }
}
