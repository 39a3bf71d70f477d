pub mod export;
pub mod extract;
pub mod health;
pub mod records;
