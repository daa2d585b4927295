pub mod crop;
pub mod decision;
pub mod forecast;
pub mod irrigation_system;
pub mod soil;
pub mod trajectory;

pub use crop::*;
pub use decision::*;
pub use forecast::*;
pub use irrigation_system::*;
pub use soil::*;
pub use trajectory::*;
