// Assessment pipeline: stage gates, the state machine, and the controller that
// persists every state change through the Profile Store.

pub mod controller;
pub mod gates;
pub mod handlers;
pub mod machine;
pub mod stage;

pub use controller::{PersistencePolicy, PipelineController, PipelineSnapshot};
pub use machine::{Command, Transition};
pub use stage::AssessmentStage;
