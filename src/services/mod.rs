//! External collaborators of the journey core, behind trait seams so the
//! domain logic stays testable and transport-agnostic.

pub mod catalog;
pub mod issuer;
pub mod photos;

pub use catalog::{StoreCatalog, TourAvailability, TourCatalog};
pub use issuer::{IssuedTicket, LocalIssuer, TicketIssuer};
pub use photos::{LocalPhotoVault, PhotoVault};
