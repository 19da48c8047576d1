use rusqlite::{params, Connection};

/// Reserve the next `post_id` for a project.
///
/// Each project row keeps the last number it handed out in `post_seq`; this
/// bumps it and returns the new value in a single statement. Call it on the
/// same transaction that inserts the post so a rolled-back insert also gives
/// the number back. Numbers of deleted posts are never handed out again.
pub fn next_post_id(conn: &Connection, project_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "UPDATE projects SET post_seq = post_seq + 1 WHERE id = ?1 RETURNING post_seq",
        params![project_id],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> (tempfile::TempDir, crate::state::DbPool) {
        let tmp = tempfile::tempdir().unwrap();
        let pool = db::create_pool(&tmp.path().join("seq.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, username, password_hash) VALUES ('u1', 'alice', 'x');
             INSERT INTO projects (id, user_id, name, title, created)
             VALUES ('p1', 'u1', 'AmberOwl', 't', datetime('now'));
             INSERT INTO projects (id, user_id, name, title, created)
             VALUES ('p2', 'u1', 'TealOtter', 't', datetime('now'));",
        )
        .unwrap();
        (tmp, pool)
    }

    #[test]
    fn numbers_start_at_one_and_increase() {
        let (_tmp, pool) = setup();
        let conn = pool.get().unwrap();
        assert_eq!(next_post_id(&conn, "p1").unwrap(), 1);
        assert_eq!(next_post_id(&conn, "p1").unwrap(), 2);
        assert_eq!(next_post_id(&conn, "p1").unwrap(), 3);
    }

    #[test]
    fn projects_are_numbered_independently() {
        let (_tmp, pool) = setup();
        let conn = pool.get().unwrap();
        assert_eq!(next_post_id(&conn, "p1").unwrap(), 1);
        assert_eq!(next_post_id(&conn, "p1").unwrap(), 2);
        assert_eq!(next_post_id(&conn, "p2").unwrap(), 1);
    }

    #[test]
    fn rolled_back_reservation_is_returned() {
        let (_tmp, pool) = setup();
        let mut conn = pool.get().unwrap();
        {
            let tx = conn.transaction().unwrap();
            assert_eq!(next_post_id(&tx, "p1").unwrap(), 1);
            // dropped without commit
        }
        assert_eq!(next_post_id(&conn, "p1").unwrap(), 1);
    }

    #[test]
    fn unknown_project_has_no_next_id() {
        let (_tmp, pool) = setup();
        let conn = pool.get().unwrap();
        assert!(matches!(
            next_post_id(&conn, "missing"),
            Err(rusqlite::Error::QueryReturnedNoRows)
        ));
    }
}
