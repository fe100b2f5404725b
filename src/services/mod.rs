pub mod canvas_gallery;
pub mod dashboard;
pub mod journal_autosave;
pub mod market;
