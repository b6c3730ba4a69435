/// Accepts a vector of T and creates a String
#[macro_export]
macro_rules! bulk_print {
    ($vec:expr, $s:expr) => {
        $vec.iter()
            .map(|x| x.print())
            .collect::<Vec<String>>()
            .join($s)
    };
}

#[macro_export]
macro_rules! parse {
    ($source:expr, $expected:expr) => {
        let stmts = match $crate::frontend::parse($source) {
            Ok(stmts) => stmts,
            Err(errors) => panic!("unexpected parser errors: {:?}", errors),
        };

        let result = $crate::frontend::ast::Stmt::pretty_print(&stmts);
        assert_eq!(result, $expected);
    };
}
