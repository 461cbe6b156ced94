//! Attribution resolver
//!
//! - top-level line: credited to its own creator, else the order creator
//! - child line with no creator or the order creator: promotion child, excluded
//! - child line with a different creator: upsell, credited to that creator
//!
//! Freebies are filtered out before attribution.

use super::error::Inconsistency;
use shared::models::{Order, OrderLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    Credited { beneficiary_id: i64, upsell: bool },
    PromotionChild,
}

impl Attribution {
    pub fn beneficiary(&self) -> Option<i64> {
        match self {
            Self::Credited { beneficiary_id, .. } => Some(*beneficiary_id),
            Self::PromotionChild => None,
        }
    }
}

pub fn resolve(order: &Order, line: &OrderLine) -> Result<Attribution, Inconsistency> {
    if !line.is_child() {
        return line
            .creator_id
            .or(order.creator_id)
            .map(|beneficiary_id| Attribution::Credited {
                beneficiary_id,
                upsell: false,
            })
            .ok_or(Inconsistency::NoBeneficiary { line_id: line.id });
    }

    match line.creator_id {
        Some(creator) if Some(creator) != order.creator_id => Ok(Attribution::Credited {
            beneficiary_id: creator,
            upsell: true,
        }),
        _ => Ok(Attribution::PromotionChild),
    }
}
