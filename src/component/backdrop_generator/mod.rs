mod artifact_state;
mod candidate_selector;
mod clip_planner;
mod encode_executor;
mod main;

pub use artifact_state::{
    ArtifactPaths, ArtifactState, BACKDROP_DIR_NAME, BACKDROP_FILE_NAME, PLACEHOLDER_SUFFIX,
};
pub use candidate_selector::{select_movie_source, select_show_source};
pub use clip_planner::{ClipPlan, Pipeline, PlanRejection, plan_clip};
pub use encode_executor::{EncodeExecutor, EncodeFailure, EncodeOutcome};
pub use main::BackdropGenerator;
