use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemStatus {
    Solved,
    Unsolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetProblemStatusRequest {
    pub status: ProblemStatus,
}
