#![cfg(feature = "rusqlite")]

use common::{setup_db, setup_locations_db};
use quarry::prelude::*;

mod common;

#[derive(Shape, Default, Debug, PartialEq)]
struct Address {
    #[shape(column = "city")]
    city: String,
}

#[derive(Shape, Default, Debug, PartialEq)]
#[shape(table = "countries")]
struct Country {
    #[shape(column = "countries.name")]
    name: String,
}

#[derive(Shape, Default, Debug, PartialEq)]
struct AddressWithCountry {
    #[shape(column = "city")]
    city: String,
    #[shape(has_one = "addresses.country_id = countries.id")]
    country: Country,
}

#[derive(Shape, Default, Debug, PartialEq)]
#[shape(conditions = "name = 'John' OR name = 'Bob'", order_by = "name")]
struct Resident {
    name: String,
}

#[derive(Shape, Default, Debug, PartialEq)]
struct Addresses {
    city: String,
    #[shape(has_many = "users.address_id = addresses.id")]
    users: Vec<Resident>,
}

#[test]
fn test_all_join() {
    #[derive(Shape, Default, Debug, PartialEq)]
    #[shape(order_by = "name DESC")]
    struct Users {
        #[shape(column = "name")]
        name: String,
        #[shape(has_one = "users.address_id = addresses.id")]
        addresses: Address,
    }

    let conn = setup_db();
    let users: Vec<Users> = all(&(), &conn, identity, &args![]).unwrap();

    assert_eq!(users.len(), 5);
    assert_eq!(
        users[0],
        Users {
            name: "John".into(),
            addresses: Address {
                city: "New York".into()
            },
        }
    );
}

#[test]
fn test_all_nested_join() {
    #[derive(Shape, Default, Debug, PartialEq)]
    #[shape(order_by = "users.name DESC")]
    struct Users {
        #[shape(column = "users.name")]
        name: String,
        #[shape(has_one = "users.address_id = addresses.id")]
        addresses: AddressWithCountry,
    }

    let conn = setup_db();
    let users: Vec<Users> = all(&(), &conn, identity, &args![]).unwrap();

    assert_eq!(
        users[0],
        Users {
            name: "John".into(),
            addresses: AddressWithCountry {
                city: "New York".into(),
                country: Country {
                    name: "United States".into()
                },
            },
        }
    );
}

#[test]
fn test_all_parallel_aliased_joins() {
    #[derive(Shape, Default, Debug, PartialEq)]
    #[shape(table = "addresses a1")]
    struct First {
        #[shape(column = "a1.city")]
        city: String,
    }

    #[derive(Shape, Default, Debug, PartialEq)]
    #[shape(table = "addresses a2")]
    struct Second {
        #[shape(column = "a2.city")]
        city: String,
    }

    #[derive(Shape, Default, Debug, PartialEq)]
    #[shape(order_by = "users.name DESC")]
    struct Users {
        #[shape(column = "users.name")]
        name: String,
        #[shape(has_one = "users.address_id = a1.id")]
        address1: First,
        #[shape(has_one = "users.address_id = a2.id")]
        address2: Second,
    }

    let conn = setup_db();
    let users: Vec<Users> = all(&(), &conn, identity, &args![]).unwrap();

    assert_eq!(users[0].name, "John");
    assert_eq!(users[0].address1.city, "New York");
    assert_eq!(users[0].address2.city, "New York");
}

#[test]
fn test_all_left_join() {
    #[derive(Shape, Default, Debug)]
    #[shape(left_join)]
    struct MaybeAddress {
        city: Option<String>,
    }

    #[derive(Shape, Default, Debug)]
    #[shape(conditions = "users.name IS NOT NULL")]
    struct Users {
        name: String,
        #[shape(has_one = "users.name = addresses.id")]
        addresses: MaybeAddress,
    }

    let conn = setup_db();
    let users: Vec<Users> = all(&(), &conn, identity, &args![]).unwrap();

    assert_eq!(users.len(), 5);
    assert!(users.iter().all(|u| u.addresses.city.is_none()));
}

#[test]
fn test_all_join_conditions_filter_rows() {
    #[derive(Shape, Default, Debug)]
    #[shape(conditions = "city != 'New York'")]
    struct Elsewhere {
        #[shape(column = "city")]
        city: String,
    }

    #[derive(Shape, Default, Debug)]
    #[shape(order_by = "name DESC")]
    struct Users {
        #[shape(column = "name")]
        name: String,
        #[shape(has_one = "users.address_id = addresses.id")]
        addresses: Elsewhere,
    }

    let conn = setup_db();
    let users: Vec<Users> = all(&(), &conn, identity, &args![]).unwrap();

    assert!(users.is_empty());
}

#[test]
fn test_all_join_many() {
    let conn = setup_db();
    let addresses: Vec<Addresses> = all(&(), &conn, identity, &args![]).unwrap();

    assert_eq!(
        addresses,
        [Addresses {
            city: "New York".into(),
            users: vec![
                Resident { name: "Bob".into() },
                Resident {
                    name: "John".into()
                },
            ],
        }]
    );
}

#[test]
fn test_all_left_join_many() {
    #[derive(Shape, Default, Debug, PartialEq)]
    #[shape(
        left_join,
        conditions = "name = 'John' OR name = 'Bob' OR name IS NULL",
        order_by = "name"
    )]
    struct MaybeResident {
        name: Option<String>,
    }

    #[derive(Shape, Default, Debug, PartialEq)]
    struct Addresses {
        city: String,
        #[shape(has_many = "users.address_id = addresses.id")]
        users: Vec<MaybeResident>,
    }

    let conn = setup_db();
    let addresses: Vec<Addresses> = all(&(), &conn, identity, &args![]).unwrap();

    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].city, "San Francisco");
    assert!(addresses[0].users.is_empty());
    assert_eq!(addresses[1].city, "New York");
    let residents: Vec<_> = addresses[1]
        .users
        .iter()
        .map(|u| u.name.as_deref())
        .collect();
    assert_eq!(residents, [Some("Bob"), Some("John")]);
}

#[test]
fn test_all_join_many_shared_row() {
    #[derive(Shape, Default, Debug)]
    struct Home {
        city: String,
    }

    #[derive(Shape, Default, Debug)]
    struct Users {
        name: String,
        #[shape(has_many = "users.address_id = addresses.id")]
        addresses: Vec<Home>,
    }

    let conn = setup_db();
    let users: Vec<Users> = all(&(), &conn, identity, &args![]).unwrap();

    // Five users share one address; each gets its own copy.
    assert_eq!(users.len(), 5);
    for user in &users {
        assert_eq!(user.addresses.len(), 1, "{}", user.name);
        assert_eq!(user.addresses[0].city, "New York");
    }
}

#[test]
fn test_all_has_many_through_join() {
    #[derive(Shape, Default, Debug)]
    struct City {
        city: Option<String>,
    }

    #[derive(Shape, Default, Debug)]
    #[shape(order_by = "locations.id")]
    struct Location {
        #[shape(has_one = "locations.address_id = addresses.id")]
        addresses: City,
    }

    #[derive(Shape, Default, Debug)]
    #[shape(table = "users", order_by = "users.id")]
    struct UsersQuery {
        name: Option<String>,
        #[shape(has_many = "locations.user_id = users.id")]
        locations: Vec<Location>,
    }

    let conn = setup_locations_db();
    let users = all(
        &(),
        &conn,
        |row: UsersQuery| {
            let cities: Vec<String> = row
                .locations
                .into_iter()
                .map(|location| location.addresses.city.unwrap_or_default())
                .collect();
            format!("{} ({})", row.name.unwrap_or_default(), cities.join(", "))
        },
        &args![],
    )
    .unwrap();

    assert_eq!(users.join("; "), "John (Paris, San Francisco); Jane (San Francisco)");
}

#[test]
fn test_all_join_many_renders_identity_columns() {
    let plan = quarry::core::Plan::of::<Addresses>(&quarry::StandardNamer).unwrap();

    assert!(plan.has_many());
    assert_eq!(
        plan.sql(),
        "SELECT addresses.id, addresses.city, users.id, users.name FROM addresses \
         INNER JOIN users ON users.address_id = addresses.id \
         WHERE (name = 'John' OR name = 'Bob') ORDER BY name"
    );
}

#[test]
fn test_missing_join_predicate_is_a_declaration_error() {
    #[derive(Shape, Default, Debug)]
    struct Broken {
        city: String,
        #[shape(has_many)]
        users: Vec<Resident>,
    }

    let conn = setup_db();
    let err = all::<Broken, Broken, _, _>(&(), &conn, identity, &args![]).unwrap_err();

    assert!(matches!(
        err,
        QuarryError::Declaration(quarry::DeclarationError::MissingJoinPredicate { .. })
    ));
    assert_eq!(
        err.to_string(),
        "Declaration error: Broken.users requires a join predicate describing the join conditions"
    );
}
