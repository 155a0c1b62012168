use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;

use storefront_rs::{
    NewProduct, NewUser, PasswordHash, ValidatedPassword, create_product, create_user,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of storefront_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test123"),
        PasswordHash::DEFAULT_COST,
    )?;

    create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: EmailAddress::from_str("test@example.com")?,
            phone: "5550100".to_owned(),
            password_hash,
        },
        &conn,
    )?;

    println!("Creating products...");

    let products = [
        ("Alpine Milk Chocolate", 350, 4),
        ("Dark Chocolate 70%", 420, 5),
        ("Hazelnut Spread", 610, 3),
        ("Oat Biscuits", 280, 4),
    ];

    for (name, price, rating) in products {
        create_product(
            NewProduct {
                name: name.to_owned(),
                price,
                rating,
                image: format!("/static/{}.png", name.to_lowercase().replace(' ', "_")),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
