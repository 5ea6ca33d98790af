pub mod chat;
pub mod doctor;
pub mod onboard;
pub mod personas;
pub mod topics;
