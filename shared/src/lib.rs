pub mod colors;
pub mod dataset;
pub mod dictionaries;
pub mod dyj;
pub mod feature;
pub mod filter;
pub mod grouping;
pub mod pipeline;
pub mod pledger;

pub use dataset::{DatasetError, DatasetSummary};
pub use dyj::{DoYourJobDistricts, DyjCode, DyjTarget};
pub use feature::FeatureId;
pub use filter::{FilterCriteria, FilterField};
pub use grouping::{DistrictSlice, GroupKey, GroupedView, StateGroups, StateSlice};
pub use pipeline::{PledgeState, SelectionState, Selectors};
pub use pledger::{PledgerRecord, PledgerStore, Status};
