//! Reading the raw movie CSV and writing the cleaned one.

mod reader;
mod writer;

pub use reader::load_movies;
pub use writer::write_csv;
