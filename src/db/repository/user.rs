use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{
    format_timestamp, not_found, now_timestamp, parse_enum, parse_timestamp, unique_or,
    DatabaseError,
};
use crate::models::*;

const USER_COLUMNS: &str =
    "id, name, email, date_of_birth, gender, is_active, created_at, updated_at";

/// Validate and insert a user. Duplicate emails fail with `UniquenessViolation`.
pub fn insert_user(conn: &Connection, create: &UserCreate) -> Result<User, DatabaseError> {
    create.validate()?;
    conn.execute(
        "INSERT INTO users (name, email, date_of_birth, gender, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        params![
            create.name,
            create.email,
            create.date_of_birth.as_ref().map(format_timestamp),
            create.gender.map(|g| g.as_str()),
            now_timestamp(),
        ],
    )
    .map_err(|e| unique_or(e, "user", "email", &create.email))?;

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, "User created");
    get_user(conn, id)?.ok_or_else(|| not_found("user", id))
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_row_from_rusqlite,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_row_from_rusqlite,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn list_users(conn: &Connection, active_only: bool) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE (?1 = 0 OR is_active = 1) ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![active_only], user_row_from_rusqlite)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

/// Apply a patch. An empty or no-op patch leaves the row untouched,
/// including `updated_at`.
pub fn update_user(conn: &Connection, id: i64, update: &UserUpdate) -> Result<User, DatabaseError> {
    update.validate()?;
    let mut user = get_user(conn, id)?.ok_or_else(|| not_found("user", id))?;
    if update.is_empty() || !update.apply_to(&mut user) {
        return Ok(user);
    }

    conn.execute(
        "UPDATE users SET name = ?2, email = ?3, date_of_birth = ?4, gender = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            id,
            user.name,
            user.email,
            user.date_of_birth.as_ref().map(format_timestamp),
            user.gender.map(|g| g.as_str()),
            now_timestamp(),
        ],
    )
    .map_err(|e| unique_or(e, "user", "email", &user.email))?;

    tracing::info!(user_id = id, "User updated");
    get_user(conn, id)?.ok_or_else(|| not_found("user", id))
}

/// Soft-deactivate. Reports owned by the user stay retrievable.
pub fn deactivate_user(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE users SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        params![id, now_timestamp()],
    )?;
    if rows == 0 {
        return Err(not_found("user", id));
    }
    tracing::info!(user_id = id, "User deactivated");
    Ok(())
}

// Internal row type for User mapping
struct UserRow {
    id: i64,
    name: String,
    email: String,
    date_of_birth: Option<String>,
    gender: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: Option<String>,
}

fn user_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        date_of_birth: row.get(3)?,
        gender: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.id,
        name: row.name,
        email: row.email,
        date_of_birth: row
            .date_of_birth
            .map(|s| parse_timestamp("date_of_birth", &s))
            .transpose()?,
        gender: row
            .gender
            .as_deref()
            .map(|g| parse_enum::<Gender>("gender", g))
            .transpose()?,
        is_active: row.is_active,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: row
            .updated_at
            .map(|s| parse_timestamp("updated_at", &s))
            .transpose()?,
    })
}
