pub mod compose;
pub mod library;
pub mod probe;
pub mod window;
