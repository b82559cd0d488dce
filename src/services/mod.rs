pub mod accounts;
pub mod curriculum;
pub mod materials;

pub use accounts::{AccountService, CreatedUser};
pub use curriculum::{BatchReport, CurriculumService, TraineeProgress};
pub use materials::MaterialsService;
