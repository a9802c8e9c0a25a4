//! End-to-end mutation flows through the public API against a recording executor.

use dbal_bulk::prelude::*;
use dbal_bulk::{BackendError, BindValue, FixedClock, Param, dialect::count_placeholders};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Journal {
    statements: Mutex<Vec<(String, Vec<Param>)>>,
    users: Vec<ResultRow>,
}

impl Journal {
    fn statements(&self) -> Vec<(String, Vec<Param>)> {
        self.statements.lock().unwrap().clone()
    }
}

impl Executor for Journal {
    async fn execute_statement(&self, sql: &str, params: &[Param]) -> Result<u64, BackendError> {
        if sql.contains("`broken`") {
            return Err(BackendError::new("Check constraint 'chk_qty' is violated.").with_code(3819));
        }
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(params.len() as u64)
    }

    async fn execute_query(
        &self,
        _sql: &str,
        _params: &[Param],
    ) -> Result<Vec<ResultRow>, BackendError> {
        Ok(self.users.clone())
    }
}

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
    nickname: Option<String>,
}

impl FromResultRow for User {
    fn from_result_row(row: &ResultRow) -> DbalResult<Self> {
        Ok(Self {
            id: row.try_get_i64("id")?,
            name: row.try_get_str("name")?,
            nickname: row.try_get_opt_str("nickname")?,
        })
    }
}

fn clock() -> FixedClock {
    FixedClock(
        chrono::NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    )
}

#[tokio::test]
async fn shared_executor_sees_every_statement_in_order() {
    let journal = Arc::new(Journal::default());
    let db = DbalManager::new(Arc::clone(&journal))
        .with_clock(clock())
        .with_config(ManagerConfig::new().no_annotation())
        .with_id_generator(UuidV4Generator);

    db.insert_bulk(
        "orders",
        vec![
            Row::new().set("sku", "a").set("qty", 1),
            Row::new().set("sku", "b").set("qty", 2),
        ],
        false,
    )
    .await
    .unwrap();
    db.update_bulk_by(
        "orders",
        vec![
            Row::new().set("sku", "a").set("qty", 3),
            Row::new().set("sku", "b").set("qty", 4),
            Row::new().set("sku", "a").set("note", "dup"),
            Row::new().set("sku", "b").set("qty", 5),
        ],
        &["sku"],
    )
    .await
    .unwrap();
    db.delete_bulk("orders", ["x", "y"]).await.unwrap();

    let statements = journal.statements();
    assert_eq!(statements.len(), 3);
    for (sql, params) in &statements {
        assert_eq!(count_placeholders(sql), params.len(), "{sql}");
    }

    let (insert, params) = &statements[0];
    assert!(insert.starts_with("INSERT INTO `orders` (sku, qty, id, createdAt, updatedAt)"));
    let id = params[2].value.as_str().unwrap();
    assert_eq!(id.len(), 36);

    let (update, _) = &statements[1];
    assert!(update.ends_with("WHERE (sku=?) OR (sku=?)"));
    assert!(update.contains("note = CASE WHEN (sku=?) THEN ? ELSE note END"));
    assert!(update.contains(
        "qty = CASE WHEN (sku=?) THEN ? WHEN (sku=?) THEN ? WHEN (sku=?) THEN ? ELSE qty END"
    ));

    assert_eq!(statements[2].0, "DELETE FROM `orders` WHERE id IN (?, ?)");
}

#[tokio::test]
async fn check_violation_surfaces_constraint_name() {
    let db = DbalManager::new(Journal::default()).with_clock(clock());
    let err = db
        .insert("broken", Row::new().set("qty", -1), false)
        .await
        .unwrap_err();

    assert!(err.is_check_violation());
    assert_eq!(err.constraint(), Some("chk_qty"));
    assert_eq!(err.backend().and_then(|b| b.code), Some(3819));
}

#[tokio::test]
async fn scoped_context_does_not_leak() {
    let journal = Arc::new(Journal::default());
    let db = DbalManager::new(Arc::clone(&journal)).with_clock(clock());

    db.in_context(CallContext::new("Nightly", "Cleanup::run"))
        .delete("sessions", 1)
        .await
        .unwrap();
    db.delete("sessions", 2).await.unwrap();

    let statements = journal.statements();
    assert!(statements[0].0.starts_with(
        r#"/* {"entryPointController":"Nightly","applicationCaller":"Cleanup::run"} */ DELETE"#
    ));
    assert!(statements[1].0.starts_with(
        r#"/* {"entryPointController":"","applicationCaller":""} */ DELETE"#
    ));
}

#[tokio::test]
async fn typed_fetch() {
    let journal = Journal {
        users: vec![
            ResultRow::new()
                .with("id", BindValue::Text("7".into()))
                .with("name", BindValue::Text("Ann".into()))
                .with("nickname", BindValue::Null),
        ],
        ..Journal::default()
    };
    let db = DbalManager::new(journal);

    let user: Option<User> = db
        .fetch_one_as("SELECT id, name, nickname FROM users WHERE id = ?", &[FieldValue::from(7)])
        .await
        .unwrap();
    assert_eq!(
        user,
        Some(User {
            id: 7,
            name: "Ann".into(),
            nickname: None,
        })
    );

    let users: Vec<User> = db.fetch_all_as("SELECT * FROM users", &[]).await.unwrap();
    assert_eq!(users.len(), 1);
}
