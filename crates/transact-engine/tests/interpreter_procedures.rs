//! Nested procedure execution: parameter binding, OUTPUT propagation,
//! result-set ordering, and the recursion guard.

mod common;
use common::*;

use std::sync::Arc;

use transact_engine::MemoryResolver;

fn resolver(sources: &[&str]) -> Arc<MemoryResolver> {
    let mut resolver = MemoryResolver::new();
    for source in sources {
        resolver.register(source).expect("procedure should parse");
    }
    Arc::new(resolver)
}

#[tokio::test]
async fn output_parameter_copies_back_to_caller() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE P @x INT, @y INT OUTPUT AS BEGIN SET @y = @x * 2 END",
    ]));

    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE @r INT EXEC P @x = 21, @y = @r OUTPUT SELECT @r",
    )
    .await;

    assert_eq!(result.result_sets.len(), 1);
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["42"]]);
}

#[tokio::test]
async fn three_level_nesting_appends_result_sets_in_order() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE L1 AS BEGIN SELECT 'L1' EXEC L2 END",
        "CREATE PROCEDURE L2 AS BEGIN SELECT 'L2' EXEC L3 END",
        "CREATE PROCEDURE L3 AS SELECT 'L3'",
    ]));

    let result = run_ok(&mut interpreter, &mut ctx, "EXEC L1").await;

    assert_eq!(result.result_sets.len(), 3);
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["L1"]]);
    assert_eq!(rows_as_strings(&result, 1), vec![vec!["L2"]]);
    assert_eq!(rows_as_strings(&result, 2), vec![vec!["L3"]]);
}

#[tokio::test]
async fn positional_arguments_bind_in_declaration_order() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Sub @a INT, @b INT AS SELECT @a - @b",
    ]));

    let result = run_ok(&mut interpreter, &mut ctx, "EXEC Sub 10, 4").await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["6"]]);
}

#[tokio::test]
async fn omitted_parameter_takes_declared_default() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Greet @who NVARCHAR(20) = 'world' AS SELECT 'hi ' + @who",
    ]));

    let result = run_ok(&mut interpreter, &mut ctx, "EXEC Greet").await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["hi world"]]);
}

#[tokio::test]
async fn missing_required_parameter_fails() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&["CREATE PROCEDURE Need @x INT AS SELECT @x"]));

    let result = interpreter.execute(&mut ctx, "EXEC Need", &[]).await;
    let error = result.error.expect("missing parameter should fail");
    assert_eq!(error.number, 201);
}

#[tokio::test]
async fn too_many_arguments_fails() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&["CREATE PROCEDURE One @x INT AS SELECT @x"]));

    let result = interpreter.execute(&mut ctx, "EXEC One 1, 2", &[]).await;
    let error = result.error.expect("extra argument should fail");
    assert!(error.message.contains("too many arguments"), "{}", error.message);
}

#[tokio::test]
async fn unknown_named_argument_fails() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&["CREATE PROCEDURE One @x INT AS SELECT @x"]));

    let result = interpreter
        .execute(&mut ctx, "EXEC One @nope = 1", &[])
        .await;
    assert!(result.error.is_some());
}

#[tokio::test]
async fn exec_without_resolver_is_rejected() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter.execute(&mut ctx, "EXEC Anything", &[]).await;
    let error = result.error.expect("no resolver configured");
    assert!(
        error.message.contains("no procedure resolver"),
        "{}",
        error.message
    );
}

#[tokio::test]
async fn return_value_propagates_from_callee() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Status AS BEGIN RETURN 3 END",
    ]));

    let result = run_ok(&mut interpreter, &mut ctx, "EXEC Status SELECT 'after'").await;
    assert_eq!(result.return_value, Some(3));
    // The caller keeps running after the callee returns.
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["after"]]);
}

#[tokio::test]
async fn callee_sees_and_mutates_shared_session_state() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Fill AS INSERT #shared VALUES (7)",
    ]));

    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "CREATE TABLE #shared (n INT) EXEC Fill SELECT n FROM #shared",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["7"]]);
}

#[tokio::test]
async fn nesting_depth_32_succeeds_and_33_fails() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Deep @d INT AS IF @d < 32 BEGIN EXEC Deep @d = @d + 1 END",
    ]));

    let result = interpreter.execute(&mut ctx, "EXEC Deep @d = 1", &[]).await;
    assert!(result.error.is_none(), "depth 32 should succeed: {:?}", result.error);

    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Deep @d INT AS IF @d < 33 BEGIN EXEC Deep @d = @d + 1 END",
    ]));
    let result = interpreter.execute(&mut ctx, "EXEC Deep @d = 1", &[]).await;
    let error = result.error.expect("depth 33 should fail");
    assert_eq!(error.number, 217);
}

#[tokio::test]
async fn callee_error_is_catchable_in_caller() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE Explode AS RAISERROR('from callee', 16, 1)",
    ]));

    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "BEGIN TRY EXEC Explode END TRY BEGIN CATCH SELECT ERROR_MESSAGE() END CATCH",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["from callee"]]);
}

#[tokio::test]
async fn rows_affected_accumulates_across_nesting() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    interpreter.set_resolver(resolver(&[
        "CREATE PROCEDURE AddTwo AS BEGIN INSERT #n VALUES (1) INSERT #n VALUES (2) END",
    ]));

    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "CREATE TABLE #n (v INT) INSERT #n VALUES (0) EXEC AddTwo",
    )
    .await;
    assert_eq!(result.rows_affected, 3);
}
