pub mod calls;
pub mod deals;

pub use calls::CallsRepo;
pub use deals::DealsRepo;
