pub mod api;
pub mod error;
pub mod history;
pub mod inventory;
pub mod memory;
pub mod models;
pub mod product_client;
pub mod purchase;
pub mod schema;
pub mod store;

mod locks;

#[cfg(test)]
mod testing;

use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection};

pub type DbPool = Pool<AsyncPgConnection>;
