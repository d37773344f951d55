use sqlx::SqliteConnection;

use crate::{
    db_types::{Client, ClientCredentials, Location},
    traits::FulfillmentError,
};

pub async fn fetch_client(client_id: i64, conn: &mut SqliteConnection) -> Result<Option<Client>, FulfillmentError> {
    let client = sqlx::query_as(
        "SELECT id, national_document, name, lastname, created_at, updated_at FROM clients WHERE id = $1",
    )
    .bind(client_id)
    .fetch_optional(conn)
    .await?;
    Ok(client)
}

pub async fn fetch_credentials(
    national_document: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ClientCredentials>, FulfillmentError> {
    let creds = sqlx::query_as(
        "SELECT id, national_document, name, lastname, password_hash FROM clients WHERE national_document = $1",
    )
    .bind(national_document)
    .fetch_optional(conn)
    .await?;
    Ok(creds)
}

/// Inserts a client record. `password_hash` must already be hashed.
pub async fn insert_client(
    national_document: &str,
    name: &str,
    lastname: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<Client, FulfillmentError> {
    let client = sqlx::query_as(
        r#"
            INSERT INTO clients (national_document, name, lastname, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, national_document, name, lastname, created_at, updated_at;
        "#,
    )
    .bind(national_document)
    .bind(name)
    .bind(lastname)
    .bind(password_hash)
    .fetch_one(conn)
    .await?;
    Ok(client)
}

pub async fn insert_location(name: &str, conn: &mut SqliteConnection) -> Result<Location, FulfillmentError> {
    let location = sqlx::query_as("INSERT INTO locations (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(location)
}
