#![cfg(feature = "rusqlite")]

use std::sync::{Arc, Mutex};

use common::setup_db;
use quarry::prelude::*;
use quarry::{ElementInfo, Namer};

mod common;

#[derive(Shape, Default, Debug)]
struct Users {
    name: Option<String>,
}

type Log = Arc<Mutex<Vec<(String, usize)>>>;

fn logging(log: &Log) -> Options {
    let log = Arc::clone(log);
    Options::new().with_logger(move |sql, args| {
        log.lock().unwrap().push((sql.to_owned(), args.len()));
    })
}

#[test]
fn test_options_log() {
    let log = Log::default();
    let db = Db::with_options(setup_db(), logging(&log));

    let _: Users = one(&(), &db, identity, &args![]).unwrap();
    let _: Vec<Users> = all(&(), &db, identity, &args![]).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        [
            ("SELECT users.name FROM users".to_owned(), 0),
            ("SELECT users.name FROM users".to_owned(), 0),
        ]
    );
}

#[test]
fn test_options_log_arguments() {
    #[derive(Shape, Default, Debug)]
    #[shape(table = "users", conditions = "name = ? OR id = ?")]
    struct Filtered {
        name: Option<String>,
    }

    let log = Log::default();
    let db = Db::with_options(setup_db(), logging(&log));

    let _: Vec<Filtered> = all(&(), &db, identity, &args!["Bob", 1]).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        [(
            "SELECT users.name FROM users WHERE (name = ? OR id = ?)".to_owned(),
            2
        )]
    );
}

#[test]
fn test_options_log_begin_transaction() {
    let log = Log::default();
    let mut db = Db::with_options(setup_db(), logging(&log));

    let tx = db.begin().unwrap();
    let _: Users = one(&(), &tx, identity, &args![]).unwrap();
    tx.rollback().unwrap();

    assert_eq!(log.lock().unwrap()[0].0, "SELECT users.name FROM users");
}

#[test]
fn test_declaration_error_issues_no_query() {
    #[derive(Shape, Default, Debug)]
    struct Broken {
        name: Option<String>,
        #[shape(has_one)]
        addresses: Users,
    }

    let log = Log::default();
    let db = Db::with_options(setup_db(), logging(&log));

    let err = one::<Broken, Broken, _, _>(&(), &db, identity, &args![]).unwrap_err();

    assert!(matches!(err, QuarryError::Declaration(_)));
    assert!(log.lock().unwrap().is_empty());
}

struct FixedNamer;

impl Namer for FixedNamer {
    fn ident(&self, _info: ElementInfo<'_>) -> String {
        "name".to_owned()
    }

    fn table(&self, _info: ElementInfo<'_>) -> String {
        "users".to_owned()
    }

    fn column(&self, _info: ElementInfo<'_>) -> String {
        "name".to_owned()
    }
}

#[test]
fn test_options_namer() {
    #[derive(Shape, Default, Debug)]
    struct People {
        user_name: String,
    }

    let log = Log::default();
    let db = Db::with_options(setup_db(), logging(&log).with_namer(FixedNamer));

    let person: People = one(&(), &db, identity, &args![]).unwrap();

    assert_eq!(person.user_name, "John");
    assert_eq!(log.lock().unwrap()[0].0, "SELECT users.name FROM users");
}

#[test]
fn test_transaction_commit() {
    let mut db = Db::open_in_memory().unwrap();
    db.inner()
        .execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
        .unwrap();

    let inserted = db.transaction(|tx| {
        tx.inner()
            .execute("INSERT INTO users (name) VALUES ('user1'), ('user2')", [])?;
        let users: Vec<Users> = all(&(), tx, identity, &args![])?;
        Ok(users.len())
    });

    assert_eq!(inserted.unwrap(), 2);
    let users: Vec<Users> = all(&(), &db, identity, &args![]).unwrap();
    assert_eq!(users.len(), 2);
}

#[test]
fn test_transaction_rollback() {
    let mut db = Db::from(setup_db());

    let result: quarry::Result<()> = db.transaction(|tx| {
        tx.inner()
            .execute("INSERT INTO users (name) VALUES ('temp_user')", [])?;
        Err(QuarryError::NotFound)
    });

    assert!(result.unwrap_err().is_not_found());
    let count = one(&(), &db, |u: Count| u.count, &args![]).unwrap();
    assert_eq!(count, 6);
}

#[derive(Shape, Default, Debug)]
#[shape(table = "users")]
struct Count {
    #[shape(column = "COUNT(*)")]
    count: i64,
}

#[test]
fn test_rusqlite_transaction_is_a_collaborator() {
    let mut conn = setup_db();
    let tx = conn.transaction().unwrap();
    tx.execute("DELETE FROM users WHERE name IS NULL", []).unwrap();

    let count = one(&(), &tx, |u: Count| u.count, &args![]).unwrap();
    assert_eq!(count, 5);

    tx.rollback().unwrap();
    let count = one(&(), &conn, |u: Count| u.count, &args![]).unwrap();
    assert_eq!(count, 6);
}

#[test]
fn test_open_missing_table() {
    let db = Db::open_in_memory().unwrap();

    let err = one::<Users, Users, _, _>(&(), &db, identity, &args![]).unwrap_err();

    assert!(matches!(err, QuarryError::Query(_)));
    assert!(err.to_string().contains("no such table: users"), "{err}");
}
