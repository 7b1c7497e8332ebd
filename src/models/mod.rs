mod pickup_point;
mod product;
mod reception;
mod user;

pub use pickup_point::{City, PickupPoint, PickupPointWithReceptions, ReceptionWithProducts};
pub use product::{Product, ProductType};
pub use reception::{DateWindow, Reception, ReceptionStatus};
pub use user::{NewUser, User, UserRole};
