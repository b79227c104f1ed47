use serde::{Deserialize, Serialize};

/// Coarse pipeline bucket derived from stage progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStatus {
    New,
    CallScheduled,
    ProposalSent,
    InProgress,
    Completed,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 5] = [
        PipelineStatus::New,
        PipelineStatus::CallScheduled,
        PipelineStatus::ProposalSent,
        PipelineStatus::InProgress,
        PipelineStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::New => "new",
            PipelineStatus::CallScheduled => "call-scheduled",
            PipelineStatus::ProposalSent => "proposal-sent",
            PipelineStatus::InProgress => "in-progress",
            PipelineStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(PipelineStatus::New),
            "call-scheduled" => Some(PipelineStatus::CallScheduled),
            "proposal-sent" => Some(PipelineStatus::ProposalSent),
            "in-progress" => Some(PipelineStatus::InProgress),
            "completed" => Some(PipelineStatus::Completed),
            _ => None,
        }
    }

    /// Map a progress ratio to a status.
    ///
    /// Branch order matters: `1.0` must be checked before `> 0.7`.
    pub fn from_progress(progress: f64) -> Self {
        if progress == 1.0 {
            PipelineStatus::Completed
        } else if progress > 0.7 {
            PipelineStatus::InProgress
        } else if progress > 0.3 {
            PipelineStatus::ProposalSent
        } else if progress > 0.0 {
            PipelineStatus::CallScheduled
        } else {
            PipelineStatus::New
        }
    }

    /// Display label shown next to a client.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStatus::New => "Новый",
            PipelineStatus::CallScheduled => "Созвон",
            PipelineStatus::ProposalSent => "КП отправлено",
            PipelineStatus::InProgress => "В работе",
            PipelineStatus::Completed => "Завершен",
        }
    }

    /// Style tag handed to the presentation layer.
    pub fn style(&self) -> &'static str {
        match self {
            PipelineStatus::New => "bg-status-new text-white",
            PipelineStatus::CallScheduled => "bg-status-call-scheduled text-white",
            PipelineStatus::ProposalSent => "bg-status-proposal-sent text-white",
            PipelineStatus::InProgress => "bg-status-in-progress text-white",
            PipelineStatus::Completed => "bg-status-completed text-white",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
