pub mod ast;
pub mod debug;
pub mod lexer;
pub mod parser;
pub mod token;

use std::thread;

use tracing::debug;

use self::ast::Stmt;
use self::lexer::Lexer;
use self::parser::Parser;
use crate::error::ParserError;

/// Parses a whole script.
///
/// The lexer and the parser run concurrently, connected by a token channel;
/// statements come back over a second channel.
pub fn parse(source: &str) -> Result<Vec<Stmt>, Vec<ParserError>> {
    // for tokenizing
    let (ts, tr) = crossbeam_channel::unbounded();
    // for parsing
    let (ps, pr) = crossbeam_channel::unbounded();

    let (lexer_errors, parser_errors) = thread::scope(|s| {
        let lexer = s.spawn(move || Lexer::new(source, ts).tokenize());
        let parser = s.spawn(move || Parser::new(tr, ps).parse());
        (
            lexer
                .join()
                .unwrap_or_else(|_| vec![ParserError::new("lexer failed", 1, 1)]),
            parser
                .join()
                .unwrap_or_else(|_| vec![ParserError::new("parser failed", 1, 1)]),
        )
    });

    // lexer errors take precedence over what the parser made of the broken stream
    let mut errors = if lexer_errors.is_empty() {
        parser_errors
    } else {
        lexer_errors
    };
    if !errors.is_empty() {
        errors.sort_by_key(|e| (e.line, e.col));
        debug!(count = errors.len(), "syntax errors");
        return Err(errors);
    }

    let stmts: Vec<Stmt> = pr.into_iter().collect();
    debug!(count = stmts.len(), "parsed statements");
    Ok(stmts)
}
