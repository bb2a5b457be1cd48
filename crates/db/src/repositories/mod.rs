//! Repository implementations of the core storage capabilities.
//!
//! Repositories hide the `SeaORM` details behind the traits the services
//! are generic over.

pub mod ledger;
pub mod session;

pub use ledger::LedgerRepository;
pub use session::SessionRepository;
