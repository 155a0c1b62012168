//! Database operations for the address book.

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    address::{Address, AddressForm, AddressSlot},
    user::{UserID, user_exists},
};

/// The most addresses a user can have, one per [AddressSlot].
pub const MAX_ADDRESSES: i64 = 2;

/// Count the addresses a user has stored.
pub fn count_addresses(user_id: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM address WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Add an address to the first free slot, home before work.
///
/// # Errors
///
/// Returns:
/// - [Error::AddressLimitExceeded] if the user already has a home and a work address,
/// - [Error::UserUpdateFailed] if `user_id` does not refer to a registered user.
pub fn add_address(
    user_id: UserID,
    form: AddressForm,
    connection: &Connection,
) -> Result<Address, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    if count_addresses(user_id, &transaction)? >= MAX_ADDRESSES {
        tracing::warn!("User {user_id} tried to add more than {MAX_ADDRESSES} addresses");
        return Err(Error::AddressLimitExceeded);
    }

    let taken = get_addresses(user_id, &transaction)?
        .into_iter()
        .map(|address| address.slot)
        .collect::<Vec<_>>();
    let slot = AddressSlot::ALL
        .into_iter()
        .find(|slot| !taken.contains(slot))
        .ok_or(Error::AddressLimitExceeded)?;

    transaction
        .execute(
            "INSERT INTO address (user_id, slot, city, street, house, postal_code)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            (
                user_id.as_i64(),
                slot,
                &form.city,
                &form.street,
                &form.house,
                &form.postal_code,
            ),
        )
        .map_err(|error| {
            tracing::warn!("Could not add address for user {user_id}: {error}");
            Error::UserUpdateFailed
        })?;

    let id = transaction.last_insert_rowid();
    transaction.commit()?;

    Ok(Address {
        id,
        slot,
        city: form.city,
        street: form.street,
        house: form.house,
        postal_code: form.postal_code,
    })
}

/// Overwrite the address in `slot`.
///
/// # Errors
///
/// Returns [Error::SlotNotFound] if the user has no address in `slot`.
pub fn edit_address(
    user_id: UserID,
    slot: AddressSlot,
    form: AddressForm,
    connection: &Connection,
) -> Result<Address, Error> {
    connection
        .query_row(
            "UPDATE address SET city = ?1, street = ?2, house = ?3, postal_code = ?4
            WHERE user_id = ?5 AND slot = ?6
            RETURNING id, slot, city, street, house, postal_code;",
            (
                &form.city,
                &form.street,
                &form.house,
                &form.postal_code,
                user_id.as_i64(),
                slot,
            ),
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::SlotNotFound(slot.to_string()),
            error => error.into(),
        })
}

/// Delete every address a user has, returning how many were deleted.
pub fn delete_addresses(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM address WHERE user_id = ?1;",
            [user_id.as_i64()],
        )
        .map_err(|error| error.into())
}

/// Get a user's addresses, home first.
pub fn get_addresses(user_id: UserID, connection: &Connection) -> Result<Vec<Address>, Error> {
    connection
        .prepare(
            "SELECT id, slot, city, street, house, postal_code FROM address
            WHERE user_id = ?1
            ORDER BY CASE slot WHEN 'home' THEN 0 ELSE 1 END;",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_address| maybe_address.map_err(|error| error.into()))
        .collect()
}

/// Get a user's address book.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not refer to a registered user.
pub fn get_address_book(user_id: UserID, connection: &Connection) -> Result<Vec<Address>, Error> {
    if !user_exists(user_id, connection)? {
        return Err(Error::NotFound);
    }

    get_addresses(user_id, connection)
}

/// Initialize the address table.
pub fn create_address_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS address (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            slot TEXT NOT NULL CHECK (slot IN ('home', 'work')),
            city TEXT NOT NULL,
            street TEXT NOT NULL,
            house TEXT NOT NULL,
            postal_code TEXT NOT NULL,
            UNIQUE(user_id, slot),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Address, rusqlite::Error> {
    Ok(Address {
        id: row.get(0)?,
        slot: row.get(1)?,
        city: row.get(2)?,
        street: row.get(3)?,
        house: row.get(4)?,
        postal_code: row.get(5)?,
    })
}
