pub mod service;
pub mod store;
pub mod views;


pub use service::*;
pub use store::*;
pub use views::*;
