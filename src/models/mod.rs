mod item;
mod price;
mod responses;

pub use item::*;
pub use price::*;
pub use responses::*;
