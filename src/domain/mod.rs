pub mod contact;
pub mod event;
pub mod hash;
pub mod media;
