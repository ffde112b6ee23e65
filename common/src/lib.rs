pub mod identity;
pub mod product;
pub mod rating;
pub mod reservation;
pub mod validation;
pub mod wire;
