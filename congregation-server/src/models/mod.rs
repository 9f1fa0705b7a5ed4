//! Record schemas with validation at construction
//!
//! All input, from HTTP bodies, admin commands or the store, is validated
//! when building these types. Invalid input returns ValidationErrors, not panic.

pub mod validation;
pub mod schema;
pub mod stats;
pub mod gallery;
pub mod contact;
pub mod user;
pub mod product;

pub use validation::{Document, FieldError, ValidationErrors};
pub use schema::{Schema, SchemaKind};
pub use stats::CongregationStats;
pub use gallery::GalleryImage;
pub use contact::ContactMessage;
pub use user::User;
pub use product::Product;
