pub mod payment;
pub mod product;
pub mod sale;
pub mod user;

pub use payment::Payment;
pub use product::Product;
pub use sale::{Sale, SaleResponse};
pub use user::{User, UserResponse};
