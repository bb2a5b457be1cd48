//! `SeaORM` entity definitions.

pub mod accounts;
pub mod sessions;
pub mod transactions;

/// Commonly used entity types.
pub mod prelude {
    pub use super::accounts::Entity as Accounts;
    pub use super::sessions::Entity as Sessions;
    pub use super::transactions::Entity as Transactions;
}
