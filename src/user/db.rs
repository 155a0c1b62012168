//! Code for creating the user table and fetching users from the database.

use email_address::EmailAddress;
use rusqlite::{Connection, Row};

use crate::{
    Error, PasswordHash,
    auth::TokenPair,
    db::current_timestamp,
    user::{NewUser, User, UserID},
};

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                token TEXT,
                refresh_token TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if the email already belongs to a user,
/// - [Error::DuplicatePhone] if the phone number already belongs to a user,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let now = current_timestamp();

    connection.execute(
        "INSERT INTO user (first_name, last_name, email, phone, password, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (
            &new_user.first_name,
            &new_user.last_name,
            new_user.email.as_str(),
            &new_user.phone,
            new_user.password_hash.as_ref(),
            now,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        phone: new_user.phone,
        password_hash: new_user.password_hash,
        created_at: now,
        updated_at: now,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, first_name, last_name, email, phone, password, created_at, updated_at
            FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database that has the specified `email` address.
///
/// # Errors
///
/// Returns a [Error::NotFound] error if there is no user with the specified email or
/// [Error::SqlError] if there are SQL related errors.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, first_name, last_name, email, phone, password, created_at, updated_at
            FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", email.as_str())], map_row)
        .map_err(|error| error.into())
}

/// Check whether `user_id` belongs to a registered user.
pub fn user_exists(user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Store the most recently issued session tokens on the user record.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_user_tokens(
    user_id: UserID,
    tokens: &TokenPair,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET token = ?1, refresh_token = ?2, updated_at = ?3 WHERE id = ?4",
        (
            &tokens.token,
            &tokens.refresh_token,
            current_timestamp(),
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(3)?;
    let raw_password_hash: String = row.get(5)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: EmailAddress::new_unchecked(raw_email),
        phone: row.get(4)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
