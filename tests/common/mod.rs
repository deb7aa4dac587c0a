#![cfg(feature = "rusqlite")]
#![allow(dead_code)]

use ::rusqlite::Connection;

/// Countries, addresses and users. Five users share the New York address and
/// one user has neither a name nor an address.
pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    conn.execute_batch(
        "CREATE TABLE countries (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT);
         CREATE TABLE addresses (id INTEGER PRIMARY KEY AUTOINCREMENT, city TEXT, country_id INTEGER REFERENCES countries(id));
         CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, address_id INTEGER REFERENCES addresses(id));
         INSERT INTO countries (name) VALUES ('United States');
         INSERT INTO addresses (city, country_id) VALUES ('San Francisco', 1), ('New York', 1);
         INSERT INTO users (name, address_id) VALUES ('John', 2), ('James', 2), ('Gary', 2), ('Joe', 2), ('Bob', 2), (NULL, NULL);",
    )
    .expect("Failed to seed database");
    conn
}

/// Users linked to addresses through a `locations` table.
pub fn setup_locations_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT);
         CREATE TABLE addresses (id INTEGER PRIMARY KEY AUTOINCREMENT, city TEXT);
         CREATE TABLE locations (id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INTEGER, address_id INTEGER);
         INSERT INTO users (name) VALUES ('John'), ('Jane');
         INSERT INTO addresses (city) VALUES ('Paris'), ('San Francisco');
         INSERT INTO locations (user_id, address_id) VALUES (1, 1), (1, 2), (2, 2);",
    )
    .expect("Failed to seed database");
    conn
}

pub fn names<T>(rows: &[T], name: impl Fn(&T) -> Option<&str>) -> Vec<String> {
    rows.iter()
        .map(|row| name(row).unwrap_or_default().to_owned())
        .collect()
}
