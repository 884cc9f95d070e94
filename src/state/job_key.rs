use std::fmt;

/// Checkpoint identity of a job: the keyword and the engine's config name
///
/// This is the typed form of one `keyword -> engine` entry in the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    pub keyword: String,
    pub engine: String,
}

impl JobKey {
    pub fn new(keyword: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            engine: engine.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.keyword, self.engine)
    }
}
