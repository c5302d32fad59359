pub mod consent;
pub mod fan;
pub mod selection;
pub mod ticket;
pub mod tour;

pub use consent::ConsentRecord;
pub use fan::Fan;
pub use selection::TourSelection;
pub use ticket::Ticket;
pub use tour::Tour;
