use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTitle {
    pub text: String,
    pub template_index: usize,
    pub template_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadingEvent {
    pub request_id: String,
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlesEvent {
    pub request_id: String,
    pub topic: String,
    pub titles: Vec<GeneratedTitle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyEvent {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub topic: String,
    pub titles: Vec<GeneratedTitle>,
    pub loading: bool,
    pub copied: Option<usize>,
}
