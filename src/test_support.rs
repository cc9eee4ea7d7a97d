//! Shared fixtures for storage-backed tests.

use crate::db::{self, DbPool};

/// A migrated in-memory database.
pub async fn test_pool() -> DbPool {
    let pool = db::create_pool_in_memory()
        .await
        .expect("in-memory pool should open");
    db::run_migrations(&pool)
        .await
        .expect("migrations should apply");
    pool
}

pub async fn seed_reader(pool: &DbPool, api_key: &str, add_card: bool, write_card: bool) -> i64 {
    sqlx::query("INSERT INTO reader (apiKey, addCard, writeCard) VALUES (?, ?, ?)")
        .bind(api_key)
        .bind(add_card)
        .bind(write_card)
        .execute(pool)
        .await
        .expect("insert reader")
        .last_insert_rowid()
}

pub async fn seed_person(pool: &DbPool, name: &str, permission: &str) -> i64 {
    sqlx::query("INSERT INTO people (name, permission) VALUES (?, ?)")
        .bind(name)
        .bind(permission)
        .execute(pool)
        .await
        .expect("insert person")
        .last_insert_rowid()
}

pub async fn seed_card(
    pool: &DbPool,
    serial_number: &str,
    authtoken: &str,
    write_key: &str,
    read_key: &str,
    owner: i64,
) {
    sqlx::query(
        "INSERT INTO cards (serialNumber, authtoken, writeKey, readKey, owner) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(serial_number)
    .bind(authtoken)
    .bind(write_key)
    .bind(read_key)
    .bind(owner)
    .execute(pool)
    .await
    .expect("insert card");
}

pub async fn seed_admin(pool: &DbPool, username: &str, password: &str, admin_tab: bool) {
    let pwhash = crate::password::hash_password(password).expect("hash password");
    sqlx::query("INSERT INTO admins (username, pwhash, adminTab) VALUES (?, ?, ?)")
        .bind(username)
        .bind(pwhash)
        .bind(admin_tab)
        .execute(pool)
        .await
        .expect("insert admin");
}

/// One `accessLog` row as the tests read it back.
#[derive(Debug, sqlx::FromRow)]
pub struct LogRow {
    pub card: Option<String>,
    pub reader: Option<i64>,
    pub people: Option<i64>,
    pub allowed: bool,
    pub comment: Option<String>,
}

/// All audit rows in insertion order.
pub async fn log_rows(pool: &DbPool) -> Vec<LogRow> {
    sqlx::query_as("SELECT card, reader, people, allowed, comment FROM accessLog ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("read access log")
}
