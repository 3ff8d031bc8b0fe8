pub mod customer_repo;
pub mod purchase_repo;

pub use customer_repo::CustomerRepository;
pub use purchase_repo::PurchaseRepository;
