//! Selection-to-participant allocation engine.

pub mod engine;
pub mod policy;
pub mod types;

pub use engine::allocate;
pub use policy::AllocationPolicy;
pub use types::Allocation;
