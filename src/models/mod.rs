pub mod batch;
pub mod course;
pub mod module;
pub mod note;
pub mod problem;
pub mod progress;
pub mod topic;
pub mod user;

pub use batch::{Batch, BatchRow, NewBatchRequest, SetTraineesRequest};
pub use course::{
    Course, CourseRow, ModuleSchedule, NewCourseRequest, SetCourseModulesRequest,
    SetModuleLockRequest, SetModuleScheduleRequest, TopicSchedule, UpdateCourseRequest,
};
pub use module::{Module, NewModuleRequest, SetModuleTopicsRequest, UpdateModuleRequest};
pub use note::{TopicNote, UpsertNoteRequest};
pub use problem::{NewProblemRequest, Problem, ProblemRow, UpdateProblemRequest};
pub use progress::{ProblemStatus, SetProblemStatusRequest};
pub use topic::{NewTopicRequest, SetTopicProblemsRequest, Topic, UpdateTopicRequest};
pub use user::{NewUserRequest, Role, User};
