use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "snake_case")]
    pub enum Condition {
        Excellent => "excellent",
        #[default]
        Good => "good",
        Fair => "fair",
        Poor => "poor",
        NeedsRepair => "needs_repair",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Condition,
    pub is_available: bool,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub team_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[serde(default)]
    pub condition: Condition,
    pub is_available: Option<bool>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub team_id: Option<i64>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipmentInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<Condition>,
    pub is_available: Option<bool>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub team_id: Option<i64>,
}

impl UpdateEquipmentInput {
    pub fn apply_to(self, equipment: &mut Equipment) {
        if let Some(name) = self.name {
            equipment.name = name;
        }
        if let Some(category) = self.category {
            equipment.category = category;
        }
        if let Some(condition) = self.condition {
            equipment.condition = condition;
        }
        if let Some(is_available) = self.is_available {
            equipment.is_available = is_available;
        }
        if self.description.is_some() {
            equipment.description = self.description;
        }
        if self.brand.is_some() {
            equipment.brand = self.brand;
        }
        if self.model.is_some() {
            equipment.model = self.model;
        }
        if self.serial_number.is_some() {
            equipment.serial_number = self.serial_number;
        }
        if self.location.is_some() {
            equipment.location = self.location;
        }
        if self.notes.is_some() {
            equipment.notes = self.notes;
        }
        if self.owner_id.is_some() {
            equipment.owner_id = self.owner_id;
        }
        if self.owner_name.is_some() {
            equipment.owner_name = self.owner_name;
        }
        if self.team_id.is_some() {
            equipment.team_id = self.team_id;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFilter {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStats {
    pub total_items: i64,
    pub available_items: i64,
    pub in_use_items: i64,
    pub categories: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<String>,
}
