//! Cursor lifecycle through the interpreter: declare, open, fetch in
//! all directions, close, deallocate, and `@@FETCH_STATUS`.

mod common;
use common::*;

use transact_core::Value;
use transact_engine::{ExecutionContext, Interpreter};

async fn seeded(rows: &[i64]) -> (Interpreter, ExecutionContext) {
    let (mut interpreter, mut ctx) = isolated_session();
    run_ok(&mut interpreter, &mut ctx, "CREATE TABLE #rows (n INT)").await;
    for n in rows {
        run_ok(
            &mut interpreter,
            &mut ctx,
            &format!("INSERT #rows VALUES ({n})"),
        )
        .await;
    }
    (interpreter, ctx)
}

fn fetch_status(interpreter: &Interpreter, ctx: &ExecutionContext) -> i64 {
    interpreter
        .get_variable(ctx, "@@FETCH_STATUS")
        .and_then(|v| v.as_int())
        .expect("@@FETCH_STATUS should be set")
}

#[tokio::test]
async fn forward_fetch_walks_rows_then_reports_end() {
    let (mut interpreter, mut ctx) = seeded(&[1, 2]).await;
    run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE c CURSOR FOR SELECT n FROM #rows
         OPEN c
         DECLARE @n INT
         FETCH NEXT FROM c INTO @n",
    )
    .await;
    assert_eq!(fetch_status(&interpreter, &ctx), 0);
    assert_eq!(interpreter.get_variable(&ctx, "@n"), Some(Value::int(1)));

    run_ok(&mut interpreter, &mut ctx, "FETCH NEXT FROM c INTO @n").await;
    assert_eq!(interpreter.get_variable(&ctx, "@n"), Some(Value::int(2)));

    run_ok(&mut interpreter, &mut ctx, "FETCH NEXT FROM c INTO @n").await;
    assert_eq!(fetch_status(&interpreter, &ctx), -1);
    // The variable keeps its last fetched value.
    assert_eq!(interpreter.get_variable(&ctx, "@n"), Some(Value::int(2)));
}

#[tokio::test]
async fn scroll_cursor_walk() {
    // LAST -> row 3, PRIOR -> row 2, ABSOLUTE 1 -> row 1,
    // PRIOR -> before-first (-1).
    let (mut interpreter, mut ctx) = seeded(&[1, 2, 3]).await;
    run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE c SCROLL CURSOR FOR SELECT n FROM #rows
         OPEN c
         DECLARE @n INT",
    )
    .await;

    run_ok(&mut interpreter, &mut ctx, "FETCH LAST FROM c INTO @n").await;
    assert_eq!(fetch_status(&interpreter, &ctx), 0);
    assert_eq!(interpreter.get_variable(&ctx, "@n"), Some(Value::int(3)));

    run_ok(&mut interpreter, &mut ctx, "FETCH PRIOR FROM c INTO @n").await;
    assert_eq!(interpreter.get_variable(&ctx, "@n"), Some(Value::int(2)));

    run_ok(&mut interpreter, &mut ctx, "FETCH ABSOLUTE 1 FROM c INTO @n").await;
    assert_eq!(interpreter.get_variable(&ctx, "@n"), Some(Value::int(1)));

    run_ok(&mut interpreter, &mut ctx, "FETCH PRIOR FROM c INTO @n").await;
    assert_eq!(fetch_status(&interpreter, &ctx), -1);
}

#[tokio::test]
async fn fetch_without_into_produces_result_set() {
    let (mut interpreter, mut ctx) = seeded(&[5]).await;
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE c CURSOR FOR SELECT n FROM #rows OPEN c FETCH NEXT FROM c",
    )
    .await;
    assert_eq!(result.result_sets.len(), 1);
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["5"]]);
}

#[tokio::test]
async fn variables_substitute_at_open_time() {
    let (mut interpreter, mut ctx) = seeded(&[1, 2, 3]).await;
    // @min is changed between DECLARE CURSOR and OPEN; the cursor
    // must see the OPEN-time value.
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE @min INT = 99
         DECLARE c CURSOR FOR SELECT n FROM #rows WHERE n > @min
         SET @min = 1
         OPEN c
         FETCH NEXT FROM c",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["2"]]);
}

#[tokio::test]
async fn reopen_after_close_re_executes_the_query() {
    let (mut interpreter, mut ctx) = seeded(&[1]).await;
    run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE c SCROLL CURSOR FOR SELECT n FROM #rows OPEN c CLOSE c",
    )
    .await;

    // New rows inserted while the cursor is closed are visible after
    // the re-OPEN.
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "INSERT #rows VALUES (2) OPEN c FETCH LAST FROM c",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["2"]]);
}

#[tokio::test]
async fn fetch_from_closed_cursor_fails() {
    let (mut interpreter, mut ctx) = seeded(&[1]).await;
    let result = interpreter
        .execute(
            &mut ctx,
            "DECLARE c CURSOR FOR SELECT n FROM #rows FETCH NEXT FROM c",
            &[],
        )
        .await;
    let error = result.error.expect("fetch before open should fail");
    assert!(error.message.contains("not open"), "{}", error.message);
}

#[tokio::test]
async fn deallocate_removes_the_cursor() {
    let (mut interpreter, mut ctx) = seeded(&[1]).await;
    run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE c CURSOR FOR SELECT n FROM #rows OPEN c CLOSE c DEALLOCATE c",
    )
    .await;

    let result = interpreter.execute(&mut ctx, "OPEN c", &[]).await;
    let error = result.error.expect("deallocated cursor is unknown");
    assert_eq!(error.number, 208);
}

#[tokio::test]
async fn forward_only_cursor_rejects_prior() {
    let (mut interpreter, mut ctx) = seeded(&[1, 2]).await;
    let result = interpreter
        .execute(
            &mut ctx,
            "DECLARE c CURSOR FORWARD_ONLY FOR SELECT n FROM #rows OPEN c FETCH PRIOR FROM c",
            &[],
        )
        .await;
    assert!(result.error.is_some());
}

#[tokio::test]
async fn while_loop_drains_cursor() {
    let (mut interpreter, mut ctx) = seeded(&[1, 2, 3, 4]).await;
    let result = run_ok(
        &mut interpreter,
        &mut ctx,
        "DECLARE c CURSOR FOR SELECT n FROM #rows
         OPEN c
         DECLARE @n INT, @sum INT = 0
         FETCH NEXT FROM c INTO @n
         WHILE @@FETCH_STATUS = 0
         BEGIN
             SET @sum = @sum + @n
             FETCH NEXT FROM c INTO @n
         END
         CLOSE c
         DEALLOCATE c
         SELECT @sum",
    )
    .await;
    assert_eq!(rows_as_strings(&result, 0), vec![vec!["10"]]);
}
