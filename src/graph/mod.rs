pub mod timeline_dag;

pub use timeline_dag::TimelineDag;
