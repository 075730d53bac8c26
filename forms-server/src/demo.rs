//! Demo schema and sample data for `--seed-demo`

use sql_forms::statements::{self, Statement};
use sql_forms::{DatabaseProvider, RecordForm};

const CREATE_AUTHORS: &str = r#"
    CREATE TABLE IF NOT EXISTS authors (
        author_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        country TEXT
    )
"#;

const CREATE_BOOKS: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        book_id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        author_id INTEGER REFERENCES authors(author_id),
        published_year INTEGER,
        price NUMERIC(8, 2)
    )
"#;

const AUTHORS: &[(&str, &str, &str)] = &[
    ("1", "Ursula K. Le Guin", "United States"),
    ("2", "Chinua Achebe", "Nigeria"),
    ("3", "Italo Calvino", "Italy"),
    ("4", "Wisława Szymborska", "Poland"),
];

const BOOKS: &[(&str, &str, &str, &str, &str)] = &[
    ("1", "The Left Hand of Darkness", "1", "1969", "14.99"),
    ("2", "The Dispossessed", "1", "1974", "15.50"),
    ("3", "Things Fall Apart", "2", "1958", "11.00"),
    ("4", "Invisible Cities", "3", "1972", "13.25"),
    ("5", "If on a winter's night a traveler", "3", "1979", "16.00"),
    ("6", "View with a Grain of Sand", "4", "1995", "12.75"),
];

/// Create the demo tables and fill them if they are empty
pub async fn seed<DB: DatabaseProvider>(database: &DB) -> sql_forms::Result<()> {
    for ddl in [CREATE_AUTHORS, CREATE_BOOKS] {
        database
            .execute(&Statement {
                sql: ddl.to_string(),
                parameters: Vec::new(),
            })
            .await?;
    }

    let authors = AUTHORS.iter().map(|(id, name, country)| {
        RecordForm::from_iter([("author_id", *id), ("name", *name), ("country", *country)])
    });
    let inserted_authors = fill(database, "authors", authors).await?;

    let books = BOOKS.iter().map(|(id, title, author, year, price)| {
        RecordForm::from_iter([
            ("book_id", *id),
            ("title", *title),
            ("author_id", *author),
            ("published_year", *year),
            ("price", *price),
        ])
    });
    let inserted_books = fill(database, "books", books).await?;

    tracing::info!(
        authors = inserted_authors,
        books = inserted_books,
        "demo data seeded"
    );
    Ok(())
}

/// Insert `records` unless the table already has rows; returns the number inserted
async fn fill<DB: DatabaseProvider>(
    database: &DB,
    table: &str,
    records: impl Iterator<Item = RecordForm>,
) -> sql_forms::Result<usize> {
    let schema = database.get_table_schema(table).await?;
    let existing = database
        .fetch_rows(&statements::select_all(database.dialect(), &schema))
        .await?;
    if !existing.is_empty() {
        return Ok(0);
    }

    let mut inserted = 0;
    for record in records {
        let statement = statements::insert(database.dialect(), &schema, &record)?;
        database.execute(&statement).await?;
        inserted += 1;
    }
    Ok(inserted)
}
