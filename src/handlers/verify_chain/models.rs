use crate::verify::{BlockReport, BlockStatus, IntegrityReport};
use serde::Serialize;

#[derive(Serialize)]
pub struct BlockReportView {
    pub block_id: u64,
    pub order_id: Option<u64>,
    pub status:   BlockStatus,
    pub issues:   Vec<String>,
}

#[derive(Serialize)]
pub struct VerifyResp {
    pub overall_valid: bool,
    pub message:       String,
    pub tampered:      usize,
    pub per_block:     Vec<BlockReportView>,
}

impl From<BlockReport> for BlockReportView {
    fn from(r: BlockReport) -> Self {
        BlockReportView {
            block_id: r.block_id,
            order_id: r.order_id,
            status:   r.status,
            issues:   r.issues.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<IntegrityReport> for VerifyResp {
    fn from(r: IntegrityReport) -> Self {
        VerifyResp {
            overall_valid: r.overall_valid,
            message:       r.message,
            tampered:      r.tampered,
            per_block:     r.blocks.into_iter().map(Into::into).collect(),
        }
    }
}
