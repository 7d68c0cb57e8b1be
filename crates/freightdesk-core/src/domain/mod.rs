pub mod call;
pub mod deal;
pub mod ids;

pub use call::{is_agreement, Call, CallFields, CallRecord, AGREEMENT_OUTCOME};
pub use deal::{Deal, DealNew, DealTerms, DealView};
pub use ids::{CallId, DealId};
