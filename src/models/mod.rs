pub mod category;
pub mod item;
pub mod product;
pub mod seller;
pub mod summary;

pub use category::*;
pub use item::*;
pub use product::*;
pub use seller::*;
pub use summary::*;
