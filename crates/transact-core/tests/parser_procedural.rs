//! Tests for procedural constructs: control flow, error handling,
//! EXEC, procedures, and cursors.

mod common;
use common::*;

use transact_core::ast::{
    CursorKind, CursorScope, ExecuteStatement, Expr, FetchDirection, Literal, Statement,
};

#[test]
fn if_else_with_blocks() {
    let Statement::If(stmt) =
        parse("IF @x > 0 BEGIN PRINT 'pos' END ELSE BEGIN PRINT 'neg' END")
    else {
        panic!("expected IF");
    };
    assert!(matches!(*stmt.then_branch, Statement::Block(ref b) if b.len() == 1));
    assert!(stmt.else_branch.is_some());
}

#[test]
fn while_loop() {
    let Statement::While(stmt) = parse("WHILE @i < 10 SET @i = @i + 1") else {
        panic!("expected WHILE");
    };
    assert!(matches!(*stmt.body, Statement::SetVariable { .. }));
}

#[test]
fn while_with_break_continue() {
    let Statement::While(stmt) =
        parse("WHILE 1 = 1 BEGIN IF @i > 5 BREAK ELSE CONTINUE END")
    else {
        panic!("expected WHILE");
    };
    let Statement::Block(body) = &*stmt.body else {
        panic!("expected block body");
    };
    assert!(matches!(body[0], Statement::If(_)));
}

#[test]
fn return_with_and_without_value() {
    assert!(matches!(parse("RETURN"), Statement::Return(None)));
    assert!(matches!(parse("RETURN 42"), Statement::Return(Some(_))));
}

#[test]
fn try_catch() {
    let Statement::TryCatch(stmt) = parse(
        "BEGIN TRY RAISERROR('x', 16, 1) END TRY BEGIN CATCH SELECT ERROR_MESSAGE() END CATCH",
    ) else {
        panic!("expected TRY/CATCH");
    };
    assert_eq!(stmt.try_block.len(), 1);
    assert_eq!(stmt.catch_block.len(), 1);
    assert!(matches!(stmt.try_block[0], Statement::Raiserror(_)));
}

#[test]
fn throw_bare_and_with_args() {
    assert!(matches!(parse("THROW"), Statement::Throw(None)));
    let Statement::Throw(Some(args)) = parse("THROW 51000, 'boom', 1") else {
        panic!("expected THROW with args");
    };
    assert!(matches!(args.number, Expr::Literal(Literal::Integer(51000))));
}

#[test]
fn raiserror_with_substitution_args() {
    let Statement::Raiserror(stmt) = parse("RAISERROR('bad value %s', 16, 1, @name)") else {
        panic!("expected RAISERROR");
    };
    assert_eq!(stmt.args.len(), 1);
}

#[test]
fn exec_dynamic_sql() {
    let Statement::Execute(ExecuteStatement::DynamicSql(expr)) = parse("EXEC(@sql)") else {
        panic!("expected dynamic EXEC");
    };
    assert!(matches!(expr, Expr::Variable(ref v) if v == "@sql"));
}

#[test]
fn exec_named_with_mixed_args() {
    let Statement::Execute(ExecuteStatement::Procedure { name, params }) =
        parse("EXEC UpdateScore @x = 21, @y = @r OUTPUT")
    else {
        panic!("expected procedure EXEC");
    };
    assert_eq!(name, "UpdateScore");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name.as_deref(), Some("@x"));
    assert!(!params[0].output);
    assert!(params[1].output);
}

#[test]
fn exec_positional_args() {
    let Statement::Execute(ExecuteStatement::Procedure { params, .. }) =
        parse("EXECUTE dbo.Audit 'login', 42")
    else {
        panic!("expected procedure EXEC");
    };
    assert_eq!(params.len(), 2);
    assert!(params[0].name.is_none());
}

#[test]
fn exec_without_args() {
    let Statement::Execute(ExecuteStatement::Procedure { name, params }) = parse("EXEC Cleanup")
    else {
        panic!("expected procedure EXEC");
    };
    assert_eq!(name, "Cleanup");
    assert!(params.is_empty());
}

#[test]
fn create_procedure_with_output_param() {
    let Statement::CreateProcedure(proc) = parse(
        "CREATE PROCEDURE Double @x INT, @y INT OUTPUT AS BEGIN SET @y = @x * 2 END",
    ) else {
        panic!("expected CREATE PROCEDURE");
    };
    assert_eq!(proc.name, "Double");
    assert_eq!(proc.params.len(), 2);
    assert!(proc.params[1].output);
    assert_eq!(proc.body.len(), 1);
}

#[test]
fn create_procedure_with_default() {
    let Statement::CreateProcedure(proc) =
        parse("CREATE PROC Greet @who NVARCHAR(20) = 'world' AS PRINT 'hi ' + @who")
    else {
        panic!("expected CREATE PROCEDURE");
    };
    assert!(proc.params[0].default.is_some());
    assert_eq!(proc.body.len(), 1);
}

#[test]
fn declare_cursor_captures_query_verbatim() {
    let Statement::DeclareCursor(cursor) =
        parse("DECLARE c CURSOR LOCAL STATIC FOR SELECT id FROM t WHERE grp = @g")
    else {
        panic!("expected DECLARE CURSOR");
    };
    assert_eq!(cursor.name, "c");
    assert_eq!(cursor.scope, CursorScope::Local);
    assert_eq!(cursor.kind, CursorKind::Static);
    assert_eq!(cursor.query, "SELECT id FROM t WHERE grp = @g");
}

#[test]
fn declare_scroll_cursor() {
    let Statement::DeclareCursor(cursor) = parse("DECLARE c SCROLL CURSOR FOR SELECT 1") else {
        panic!("expected DECLARE CURSOR");
    };
    assert!(cursor.scroll);
}

#[test]
fn fetch_directions() {
    let Statement::Fetch(f) = parse("FETCH NEXT FROM c INTO @a, @b") else {
        panic!("expected FETCH");
    };
    assert_eq!(f.direction, FetchDirection::Next);
    assert_eq!(f.into, vec!["@a", "@b"]);

    let Statement::Fetch(f) = parse("FETCH ABSOLUTE -2 FROM c") else {
        panic!("expected FETCH");
    };
    assert_eq!(f.direction, FetchDirection::Absolute(-2));

    let Statement::Fetch(f) = parse("FETCH c") else {
        panic!("expected FETCH");
    };
    assert_eq!(f.direction, FetchDirection::Next);
    assert_eq!(f.cursor, "c");
}

#[test]
fn cursor_lifecycle_statements() {
    assert!(matches!(
        parse("OPEN c"),
        Statement::OpenCursor { name } if name == "c"
    ));
    assert!(matches!(
        parse("CLOSE c"),
        Statement::CloseCursor { name } if name == "c"
    ));
    assert!(matches!(
        parse("DEALLOCATE c"),
        Statement::DeallocateCursor { name } if name == "c"
    ));
}

#[test]
fn nested_blocks() {
    let Statement::Block(outer) = parse("BEGIN BEGIN SELECT 1 END SELECT 2 END") else {
        panic!("expected block");
    };
    assert_eq!(outer.len(), 2);
    assert!(matches!(outer[0], Statement::Block(_)));
}
