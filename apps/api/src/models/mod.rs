pub mod career;
pub mod course;
pub mod pathway;
