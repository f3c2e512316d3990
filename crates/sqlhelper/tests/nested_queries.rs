//! Builder output executed through pooled handles, the way a driver wrapper uses this crate.

use sqlhelper::{
    Columns, HandleId, PoolConfig, SqlError, SqlResult, StatementHandle, StatementPool,
    StatementSource, columns, sql,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
#[error("statement already closed")]
struct Closed;

/// Records every statement executed on the connection, tagged with the handle that ran it.
#[derive(Default)]
struct RecordingConn {
    next: usize,
    journal: Rc<RefCell<Vec<(usize, String)>>>,
}

struct RecordingStmt {
    id: usize,
    open: bool,
    journal: Rc<RefCell<Vec<(usize, String)>>>,
}

impl RecordingStmt {
    fn execute(&mut self, sql: &str) -> Result<(), Closed> {
        if !self.open {
            return Err(Closed);
        }
        self.journal.borrow_mut().push((self.id, sql.to_string()));
        Ok(())
    }
}

impl StatementSource for RecordingConn {
    type Handle = RecordingStmt;
    type Error = Closed;

    fn create_statement(&mut self) -> Result<RecordingStmt, Closed> {
        let id = self.next;
        self.next += 1;
        Ok(RecordingStmt {
            id,
            open: true,
            journal: self.journal.clone(),
        })
    }
}

impl StatementHandle for RecordingStmt {
    type Error = Closed;

    fn close(&mut self) -> Result<(), Closed> {
        if !self.open {
            return Err(Closed);
        }
        self.open = false;
        Ok(())
    }
}

fn execute(pool: &mut StatementPool<RecordingConn>, id: HandleId, sql: &str) -> SqlResult<()> {
    pool.handle_mut(id)?.execute(sql).map_err(SqlError::driver)
}

#[test]
fn nested_queries_use_distinct_handles() {
    let conn = RecordingConn::default();
    let journal = conn.journal.clone();
    let mut pool = StatementPool::new(conn);

    pool.with_handle(|pool, outer| {
        execute(pool, outer, &sql::select("orders", columns! { "status" => "open" })?)?;
        for order_id in [10, 11] {
            pool.with_handle(|pool, inner| {
                let q = sql::count("order_items", columns! { "order_id" => order_id })?;
                execute(pool, inner, &q)
            })?;
        }
        Ok::<_, SqlError>(())
    })
    .unwrap();

    let journal = journal.borrow();
    assert_eq!(
        *journal,
        [
            (0, "select * from orders where status = 'open'".to_string()),
            (1, "select count(*) from order_items where order_id = 10".to_string()),
            (1, "select count(*) from order_items where order_id = 11".to_string()),
        ]
    );
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.occupied_count(), 0);
}

#[test]
fn rejected_sql_never_reaches_a_handle() {
    let conn = RecordingConn::default();
    let journal = conn.journal.clone();
    let mut pool = StatementPool::new(conn);

    let err = pool
        .with_handle(|pool, id| {
            let q = sql::delete("users", "id = 1; drop table users")?;
            execute(pool, id, &q)
        })
        .unwrap_err();

    assert!(err.is_rejected_sql());
    assert!(journal.borrow().is_empty());
    assert_eq!(pool.occupied_count(), 0);
}

#[test]
fn recursion_deeper_than_ceiling_fails_and_unwinds() {
    fn walk(pool: &mut StatementPool<RecordingConn>, depth: u32) -> SqlResult<()> {
        pool.with_handle(|pool, id| {
            let q = sql::select("categories", columns! { "depth" => depth })?;
            execute(pool, id, &q)?;
            walk(pool, depth + 1)
        })
    }

    let conn = RecordingConn::default();
    let journal = conn.journal.clone();
    let mut pool = StatementPool::with_config(conn, PoolConfig::new().max_size(4));

    let err = walk(&mut pool, 0).unwrap_err();
    assert!(err.is_nesting_too_deep());
    assert_eq!(journal.borrow().len(), 4);
    assert_eq!(pool.occupied_count(), 0);
    assert_eq!(pool.free_count(), 4);
}

#[test]
fn json_payload_to_update() {
    let payload = serde_json::json!({
        "title": "Rock 'n' Roll",
        "year": 1955,
        "where": { "id": 3 }
    });
    let data = Columns::try_from(payload).unwrap();
    let q = sql::update("albums", data).unwrap();
    assert_eq!(
        q,
        "update albums set title = 'Rock ''n'' Roll', year = 1955 where id = 3"
    );

    let conn = RecordingConn::default();
    let journal = conn.journal.clone();
    let mut pool = StatementPool::new(conn);
    pool.with_handle(|pool, id| execute(pool, id, &q)).unwrap();
    pool.close().unwrap();

    assert_eq!(journal.borrow()[0].1, q);
    assert!(pool.is_closed());
}
