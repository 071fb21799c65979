mod demographics;
mod extract;
mod filename;
mod grid;
mod pipeline;
mod regions;
mod run;
mod store;
mod unpivot;

pub use grid::Cell;
pub use run::run;
