mod common;

#[test]
fn creates_database_and_runs_migrations() {
    let test_db = common::TestDb::new("db_smoke.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}
