//! Data models for ShareIt

pub mod booking;
pub mod comment;
pub mod item;
pub mod page;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use booking::{Booking, BookingDetails, BookingState, BookingStatus};
pub use comment::CommentDetails;
pub use item::{Item, ItemDetails};
pub use page::{Page, PageQuery};
pub use request::{ItemRequest, ItemRequestDetails};
pub use user::User;
