pub mod issue;
pub mod repo;
pub mod report;

pub use issue::*;
pub use repo::RepoId;
pub use report::*;
