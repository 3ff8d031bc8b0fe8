pub mod customer_service;
pub mod payment;
pub mod purchase_service;
pub mod store;
pub mod translation_service;
