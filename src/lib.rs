pub mod config;
pub mod cycle;
pub mod discipline;
pub mod error;
pub mod exams;
pub mod feed;
pub mod grades;
pub mod lesson;
pub mod merge;
pub mod page;
pub mod refresh;
pub mod store;
pub mod timetable;
pub mod util;
pub mod view;
