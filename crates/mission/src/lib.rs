pub mod capture;
pub mod http;
pub mod repository;
pub mod stage;
pub mod submit;

pub use capture::*;
pub use http::*;
pub use repository::*;
pub use stage::*;
pub use submit::*;
