use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Frontend,
    Backend,
    Database,
    Domain,
    Email,
    Cicd,
}

impl BlockKind {
    pub const ALL: [BlockKind; 6] = [
        BlockKind::Frontend,
        BlockKind::Backend,
        BlockKind::Database,
        BlockKind::Domain,
        BlockKind::Email,
        BlockKind::Cicd,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BlockKind::Frontend => "frontend",
            BlockKind::Backend => "backend",
            BlockKind::Database => "database",
            BlockKind::Domain => "domain",
            BlockKind::Email => "email",
            BlockKind::Cicd => "cicd",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BlockKind::Frontend => "Frontend",
            BlockKind::Backend => "Backend",
            BlockKind::Database => "Database",
            BlockKind::Domain => "Domain",
            BlockKind::Email => "Email",
            BlockKind::Cicd => "CI/CD",
        }
    }

    pub fn is_repository(self) -> bool {
        matches!(self, BlockKind::Frontend | BlockKind::Backend)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Pending,
    Connecting,
    Connected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentBlock {
    pub id: String,
    pub kind: BlockKind,
    pub name: String,
    pub status: BlockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DeploymentBlock {
    pub fn pending(kind: BlockKind) -> Self {
        DeploymentBlock {
            id: kind.id().to_string(),
            kind,
            name: kind.display_name().to_string(),
            status: BlockStatus::Pending,
            details: None,
        }
    }

    /// `details` when present, otherwise the block name.
    pub fn label(&self) -> &str {
        self.details.as_deref().unwrap_or(&self.name)
    }
}

/// The fixed set of blocks a guided deployment walks through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentBoard {
    blocks: Vec<DeploymentBlock>,
}

impl Default for DeploymentBoard {
    fn default() -> Self {
        DeploymentBoard {
            blocks: BlockKind::ALL.iter().map(|k| DeploymentBlock::pending(*k)).collect(),
        }
    }
}

impl DeploymentBoard {
    pub fn blocks(&self) -> &[DeploymentBlock] {
        &self.blocks
    }

    pub fn get(&self, kind: BlockKind) -> Option<&DeploymentBlock> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    pub fn status(&self, kind: BlockKind) -> Option<BlockStatus> {
        self.get(kind).map(|b| b.status)
    }

    pub fn set_status(&mut self, kinds: &[BlockKind], status: BlockStatus) {
        for block in self.blocks.iter_mut().filter(|b| kinds.contains(&b.kind)) {
            block.status = status;
        }
    }

    pub fn connect(&mut self, kind: BlockKind, details: impl Into<String>) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.kind == kind) {
            block.status = BlockStatus::Connected;
            block.details = Some(details.into());
        }
    }

    pub fn rename(&mut self, kind: BlockKind, name: impl Into<String>) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.kind == kind) {
            block.name = name.into();
        }
    }

    pub fn connected(&self) -> impl Iterator<Item = &DeploymentBlock> {
        self.blocks.iter().filter(|b| b.status == BlockStatus::Connected)
    }
}
