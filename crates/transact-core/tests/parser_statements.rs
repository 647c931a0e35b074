//! Tests for statement-level parsing: SELECT shapes, DML, DDL,
//! DECLARE, and batches.

mod common;
use common::*;

use transact_core::ast::{
    DataType, DeclareItem, Expr, InsertSource, Literal, Statement, TableRef,
};

#[test]
fn select_top_star() {
    let s = parse_select("SELECT TOP 3 * FROM t");
    assert!(matches!(s.top, Some(Expr::Literal(Literal::Integer(3)))));
    assert!(matches!(s.columns[0].expr, Expr::Wildcard { table: None }));
}

#[test]
fn select_top_parenthesized_variable() {
    let s = parse_select("SELECT TOP (@n) id FROM t");
    assert!(matches!(s.top, Some(Expr::Variable(ref v)) if v == "@n"));
}

#[test]
fn select_into_temp_table() {
    let s = parse_select("SELECT id, name INTO #snapshot FROM users WHERE active = 1");
    assert_eq!(s.into.as_deref(), Some("#snapshot"));
    assert!(s.where_clause.is_some());
}

#[test]
fn select_variable_assignment_columns() {
    let s = parse_select("SELECT @a = id, @b = name FROM users");
    assert_eq!(s.columns[0].assign_to.as_deref(), Some("@a"));
    assert_eq!(s.columns[1].assign_to.as_deref(), Some("@b"));
    assert!(s.is_assignment());
}

#[test]
fn select_from_temp_table() {
    let s = parse_select("SELECT * FROM #t");
    assert!(matches!(
        s.from,
        Some(TableRef::Table { ref name, .. }) if name == "#t"
    ));
}

#[test]
fn select_with_join() {
    let s = parse_select(
        "SELECT u.id, o.total FROM users u INNER JOIN orders o ON o.user_id = u.id",
    );
    assert!(matches!(s.from, Some(TableRef::Join { .. })));
}

#[test]
fn select_left_function_not_join() {
    // LEFT( is the string function, not a LEFT JOIN.
    let s = parse_select("SELECT LEFT(name, 3) FROM users");
    assert!(matches!(
        &s.columns[0].expr,
        Expr::Function(call) if call.name == "LEFT" && call.args.len() == 2
    ));
}

#[test]
fn insert_values_multiple_rows() {
    let Statement::Insert(i) = parse("INSERT #t VALUES (1, 'a'), (2, 'b')") else {
        panic!("expected INSERT");
    };
    assert_eq!(i.table, "#t");
    let InsertSource::Values(rows) = i.source else {
        panic!("expected VALUES");
    };
    assert_eq!(rows.len(), 2);
}

#[test]
fn insert_select() {
    let Statement::Insert(i) = parse("INSERT INTO t (a, b) SELECT a, b FROM #src") else {
        panic!("expected INSERT");
    };
    assert_eq!(i.columns, vec!["a", "b"]);
    assert!(matches!(i.source, InsertSource::Query(_)));
}

#[test]
fn update_with_where() {
    let Statement::Update(u) = parse("UPDATE t SET a = 1, b = b + 1 WHERE id = @id") else {
        panic!("expected UPDATE");
    };
    assert_eq!(u.assignments.len(), 2);
    assert!(u.where_clause.is_some());
}

#[test]
fn delete_without_from() {
    let Statement::Delete(d) = parse("DELETE #t WHERE id = 1") else {
        panic!("expected DELETE");
    };
    assert_eq!(d.table, "#t");
}

#[test]
fn declare_scalar_with_initializer() {
    let Statement::Declare(items) = parse("DECLARE @x INT = 5, @s NVARCHAR(50)") else {
        panic!("expected DECLARE");
    };
    assert_eq!(items.len(), 2);
    assert!(matches!(
        &items[0],
        DeclareItem::Scalar { name, data_type: DataType::Int, init: Some(_) } if name == "@x"
    ));
    assert!(matches!(
        &items[1],
        DeclareItem::Scalar {
            name,
            data_type: DataType::NVarChar(Some(50)),
            init: None
        } if name == "@s"
    ));
}

#[test]
fn declare_table_variable() {
    let Statement::Declare(items) =
        parse("DECLARE @t TABLE (id INT IDENTITY(1,1) PRIMARY KEY, n NVARCHAR(30) NOT NULL)")
    else {
        panic!("expected DECLARE");
    };
    let DeclareItem::Table { name, columns } = &items[0] else {
        panic!("expected table variable");
    };
    assert_eq!(name, "@t");
    assert_eq!(columns.len(), 2);
    assert!(columns[0].identity.is_some());
    assert!(columns[0].primary_key);
    assert!(!columns[1].nullable);
}

#[test]
fn create_table_temp() {
    let Statement::CreateTable(c) = parse("CREATE TABLE #t (id INT, n NVARCHAR(50))") else {
        panic!("expected CREATE TABLE");
    };
    assert_eq!(c.name, "#t");
    assert_eq!(c.columns.len(), 2);
}

#[test]
fn create_table_varchar_max() {
    let Statement::CreateTable(c) = parse("CREATE TABLE t (body NVARCHAR(MAX))") else {
        panic!("expected CREATE TABLE");
    };
    assert_eq!(c.columns[0].data_type, DataType::NVarChar(None));
}

#[test]
fn drop_and_truncate() {
    assert!(matches!(
        parse("DROP TABLE #t"),
        Statement::DropTable { name } if name == "#t"
    ));
    assert!(matches!(
        parse("TRUNCATE TABLE #t"),
        Statement::TruncateTable { name } if name == "#t"
    ));
}

#[test]
fn with_cte_select() {
    let Statement::With(w) = parse(
        "WITH recent (id) AS (SELECT id FROM orders WHERE ts > @since) SELECT * FROM recent",
    ) else {
        panic!("expected WITH");
    };
    assert_eq!(w.ctes.len(), 1);
    assert_eq!(w.ctes[0].name, "recent");
    assert_eq!(w.ctes[0].columns, vec!["id"]);
    assert!(matches!(*w.body, Statement::Select(_)));
}

#[test]
fn transactions() {
    assert!(matches!(parse("BEGIN TRANSACTION"), Statement::BeginTransaction));
    assert!(matches!(parse("BEGIN TRAN"), Statement::BeginTransaction));
    assert!(matches!(parse("COMMIT"), Statement::CommitTransaction));
    assert!(matches!(
        parse("ROLLBACK TRANSACTION"),
        Statement::RollbackTransaction
    ));
}

#[test]
fn set_variants() {
    assert!(matches!(
        parse("SET @x = @x + 1"),
        Statement::SetVariable { ref name, .. } if name == "@x"
    ));
    assert!(matches!(
        parse("SET NOCOUNT ON"),
        Statement::SetOption { ref option, enabled: true } if option == "NOCOUNT"
    ));
}

#[test]
fn batch_with_go_separator() {
    let program = parse_program("SELECT 1\nGO\nSELECT 2");
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn semicolons_are_optional() {
    let program = parse_program("DECLARE @x INT SET @x = 1 SELECT @x");
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn garbage_is_an_error() {
    parse_err("FLURB 1");
    parse_err("SELECT FROM");
}
