pub mod event;
pub mod product;
pub mod snapshot;

pub use event::{EventError, InvocationEvent};
pub use product::TrackedProduct;
pub use snapshot::PriceSnapshot;
