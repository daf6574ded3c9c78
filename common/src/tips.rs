//! エコTips（スキャナ待機中に表示）

pub const ECO_TIPS: &[&str] = &[
    "Carry a reusable water bottle to reduce plastic waste.",
    "Opt for cloth bags instead of plastic bags when shopping.",
    "Compost your food scraps to reduce landfill waste and enrich your soil.",
    "Donate old clothes and items instead of throwing them away.",
    "Avoid single-use plastics like straws, cutlery, and coffee cups.",
    "Repair broken items instead of replacing them.",
    "Choose products with minimal or recyclable packaging.",
    "Switch to rechargeable batteries to reduce hazardous waste.",
];

/// Tipsの巡回カーソル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipCursor {
    index: usize,
}

impl TipCursor {
    /// 通日（1始まり）から今日のTipを選ぶ
    pub fn for_day(day_of_year: u32) -> Self {
        Self {
            index: (day_of_year as usize) % ECO_TIPS.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static str {
        ECO_TIPS[self.index]
    }

    pub fn next(self) -> Self {
        Self {
            index: (self.index + 1) % ECO_TIPS.len(),
        }
    }

    pub fn prev(self) -> Self {
        Self {
            index: (self.index + ECO_TIPS.len() - 1) % ECO_TIPS.len(),
        }
    }
}
