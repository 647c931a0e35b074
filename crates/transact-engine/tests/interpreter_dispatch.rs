//! Statement dispatch against the backend: dialect translation,
//! parameter binding, control flow, error handling, and counters.

mod common;
use common::*;

use transact_core::Value;

#[tokio::test]
async fn top_is_rewritten_to_limit_for_sqlite() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(&mut interpreter, &mut ctx, "SELECT TOP 3 * FROM t").await;
    assert_eq!(backend.sent(), vec!["SELECT * FROM t LIMIT 3"]);
}

#[tokio::test]
async fn emitted_sql_contains_no_tsql_tokens() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "SELECT TOP 1 ISNULL(LEN(name), 0), GETDATE() FROM t WHERE CHARINDEX('x', name) > 0",
    )
    .await;

    let sent = backend.sent().join("\n");
    for token in ["TOP", "ISNULL", "LEN(", "GETDATE", "CHARINDEX"] {
        assert!(!sent.contains(token), "found {token} in: {sent}");
    }
    assert!(sent.contains("INSTR(name, 'x')"));
}

#[tokio::test]
async fn variables_bind_as_placeholders() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE @min INT = 5, @grp NVARCHAR(10) = 'a'
         SELECT * FROM t WHERE n > @min AND grp = @grp",
    )
    .await;

    assert_eq!(
        backend.sent(),
        vec!["SELECT * FROM t WHERE n > ? AND grp = ?"]
    );
    assert_eq!(
        backend.params(0),
        vec![Value::int(5), Value::nvarchar("a")]
    );
}

#[tokio::test]
async fn string_concat_becomes_pipes_for_sqlite() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "SELECT 'x' + name FROM t",
    )
    .await;
    assert_eq!(backend.sent(), vec!["SELECT 'x' || name FROM t"]);
}

#[tokio::test]
async fn rowcount_and_identity_track_backend_dml() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "INSERT INTO t (n) VALUES (1) SELECT @@ROWCOUNT, @@IDENTITY",
    )
    .await;

    // The mock reports 1 row affected, identity 42.
    assert_eq!(result.rows_affected, 1);
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["1", "42"]]);
    assert_eq!(result.last_insert_id, Some(42));
}

#[tokio::test]
async fn with_cte_is_forwarded_whole() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "WITH recent AS (SELECT TOP 2 id FROM orders) SELECT * FROM recent",
    )
    .await;
    assert_eq!(
        backend.sent(),
        vec!["WITH recent AS (SELECT id FROM orders LIMIT 2) SELECT * FROM recent"]
    );
}

#[tokio::test]
async fn transactions_forward_to_backend() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "BEGIN TRANSACTION COMMIT TRANSACTION",
    )
    .await;
    assert_eq!(backend.sent(), vec!["BEGIN", "COMMIT"]);
    assert_eq!(ctx.transaction_depth, 0);
}

#[tokio::test]
async fn create_table_types_are_normalized() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "CREATE TABLE users (id BIGINT, name NVARCHAR(50), blob VARBINARY(16))",
    )
    .await;
    assert_eq!(
        backend.sent(),
        vec!["CREATE TABLE users (id INTEGER, name TEXT, blob BLOB)"]
    );
}

#[tokio::test]
async fn truncate_backend_table_becomes_delete_on_sqlite() {
    let (backend, mut interpreter, mut ctx) = mock_session();
    run_ok(&mut interpreter, &mut ctx, "TRUNCATE TABLE events").await;
    assert_eq!(backend.sent(), vec!["DELETE FROM events"]);
}

#[tokio::test]
async fn if_else_and_while_loop() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE @i INT = 0, @label NVARCHAR(10)
         WHILE @i < 5 SET @i = @i + 1
         IF @i = 5 SET @label = 'five' ELSE SET @label = 'other'
         SELECT @i, @label",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["5", "five"]]);
}

#[tokio::test]
async fn while_supports_break_and_continue() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE @i INT = 0, @sum INT = 0
         WHILE 1 = 1
         BEGIN
             SET @i = @i + 1
             IF @i > 10 BREAK
             IF @i % 2 = 0 CONTINUE
             SET @sum = @sum + @i
         END
         SELECT @sum",
    )
    .await;
    // 1 + 3 + 5 + 7 + 9
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["25"]]);
}

#[tokio::test]
async fn while_iteration_cap_stops_runaway_loops() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter
        .execute(&mut ctx, "DECLARE @x INT = 0 WHILE 1 = 1 SET @x = @x + 1", &[])
        .await;
    let error = result.error.expect("loop should be capped");
    assert!(error.message.contains("10000"), "{}", error.message);
}

#[tokio::test]
async fn declare_yields_typed_null() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    run_ok(&mut interpreter, &mut ctx, "DECLARE @v NVARCHAR(20)").await;
    let value = interpreter.get_variable(&ctx, "@v").unwrap();
    assert!(value.is_null());
    assert_eq!(value.ty, transact_core::SqlType::NVarChar);
}

#[tokio::test]
async fn return_stops_the_batch() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "SELECT 'before' RETURN 7 SELECT 'after'",
    )
    .await;
    assert_eq!(result.result_sets.len(), 1);
    assert_eq!(result.return_value, Some(7));
}

#[tokio::test]
async fn try_catch_recovers_and_exposes_error_functions() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "BEGIN TRY RAISERROR('x', 16, 1) END TRY
         BEGIN CATCH SELECT @@ERROR AS e, ERROR_MESSAGE() AS m END CATCH",
    )
    .await;
    assert_eq!(result.result_sets.len(), 1);
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["50000", "x"]]);
}

#[tokio::test]
async fn low_severity_raiserror_is_informational() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "RAISERROR('heads up %s', 10, 1, 'now') SELECT 'still running'",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["still running"]]);
}

#[tokio::test]
async fn throw_inside_catch_re_raises() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter
        .execute(
            &mut ctx,
            "BEGIN TRY RAISERROR('inner', 16, 1) END TRY BEGIN CATCH THROW END CATCH",
            &[],
        )
        .await;
    let error = result.error.expect("re-raise should escape");
    assert_eq!(error.number, 50000);
    assert_eq!(error.message, "inner");
}

#[tokio::test]
async fn throw_with_arguments_carries_number() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter
        .execute(&mut ctx, "THROW 51000, 'boom', 2", &[])
        .await;
    let error = result.error.expect("throw should fail the batch");
    assert_eq!(error.number, 51000);
    assert_eq!(error.state, 2);
}

#[tokio::test]
async fn nested_try_catch_propagates_outward() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "BEGIN TRY
             BEGIN TRY RAISERROR('deep', 16, 1) END TRY
             BEGIN CATCH THROW END CATCH
         END TRY
         BEGIN CATCH SELECT ERROR_MESSAGE() END CATCH",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["deep"]]);
}

#[tokio::test]
async fn divide_by_zero_is_catchable_with_native_number() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "BEGIN TRY SELECT 1 / 0 END TRY BEGIN CATCH SELECT ERROR_NUMBER() END CATCH",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["8134"]]);
}

#[tokio::test]
async fn exec_dynamic_sql_runs_inline() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE @sql NVARCHAR(100) = 'SELECT 1 + 1' EXEC(@sql)",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["2"]]);
}

#[tokio::test]
async fn sp_executesql_binds_declared_parameters() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "EXEC sp_executesql N'SELECT @a + @b', N'@a int, @b int', 40, 2",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["42"]]);
}

#[tokio::test]
async fn parse_errors_surface_as_batch_error() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter.execute(&mut ctx, "SELEC 1", &[]).await;
    let error = result.error.expect("parse failure expected");
    assert!(error.message.contains("Parse error"), "{}", error.message);
}

#[tokio::test]
async fn partial_results_survive_failure() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter
        .execute(&mut ctx, "SELECT 'first' THROW 51000, 'stop', 1", &[])
        .await;
    assert_eq!(result.result_sets.len(), 1);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn cancellation_stops_at_statement_boundary() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    ctx.cancel.cancel();
    let result = interpreter.execute(&mut ctx, "SELECT 1", &[]).await;
    let error = result.error.expect("cancelled run should fail");
    assert!(error.message.contains("cancelled"), "{}", error.message);
    assert!(result.result_sets.is_empty());
}

#[tokio::test]
async fn cancellation_is_not_caught_by_catch() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    ctx.cancel.cancel();
    let result = interpreter
        .execute(
            &mut ctx,
            "BEGIN TRY SELECT 1 END TRY BEGIN CATCH SELECT 'caught' END CATCH",
            &[],
        )
        .await;
    assert!(result.error.is_some());
    assert!(result.result_sets.is_empty());
}

#[tokio::test]
async fn execute_scalar_and_non_query_helpers() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let value = interpreter
        .execute_scalar(&mut ctx, "SELECT 40 + 2", &[])
        .await
        .unwrap();
    assert_eq!(value, Some(Value::int(42)));

    let affected = interpreter
        .execute_non_query(&mut ctx, "INSERT INTO t (n) VALUES (1)", &[])
        .await
        .unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn caller_supplied_parameters_are_bound() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    let result = interpreter
        .execute(
            &mut ctx,
            "SELECT @name",
            &[(String::from("@name"), Value::nvarchar("ada"))],
        )
        .await;
    assert!(result.error.is_none());
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["ada"]]);
}

#[tokio::test]
async fn print_and_set_options_are_accepted() {
    let (_backend, mut interpreter, mut ctx) = mock_session();
    run_ok(
        &mut interpreter,
        &mut ctx,
        "SET NOCOUNT ON PRINT 'hello ' + 'world' SET NOCOUNT OFF",
    )
    .await;
}
