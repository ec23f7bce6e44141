use reqwest::Method;

use crate::client::{KitLogClient, Result};
use crate::database::models::{
    CategoryList, CreateEquipmentInput, Equipment, EquipmentFilter, EquipmentStats,
    UpdateEquipmentInput,
};

impl KitLogClient {
    pub async fn list_equipment(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>> {
        let url = self.api_url(&["equipment"])?;
        let builder = self.request(Method::GET, url).await.query(filter);
        self.send(builder).await
    }

    pub async fn get_equipment(&self, id: i64) -> Result<Equipment> {
        self.get(self.api_url(&["equipment", &id.to_string()])?)
            .await
    }

    pub async fn create_equipment(&self, input: &CreateEquipmentInput) -> Result<Equipment> {
        self.post(self.api_url(&["equipment"])?, input).await
    }

    pub async fn update_equipment(
        &self,
        id: i64,
        input: &UpdateEquipmentInput,
    ) -> Result<Equipment> {
        self.put(self.api_url(&["equipment", &id.to_string()])?, input)
            .await
    }

    pub async fn delete_equipment(&self, id: i64) -> Result<()> {
        self.delete(self.api_url(&["equipment", &id.to_string()])?)
            .await
    }

    pub async fn equipment_stats(&self, owner_id: Option<&str>) -> Result<EquipmentStats> {
        let url = self.api_url(&["equipment", "stats", "summary"])?;
        let mut builder = self.request(Method::GET, url).await;
        if let Some(owner_id) = owner_id {
            builder = builder.query(&[("ownerId", owner_id)]);
        }
        self.send(builder).await
    }

    pub async fn equipment_categories(&self) -> Result<Vec<String>> {
        let list: CategoryList = self
            .get(self.api_url(&["equipment", "categories", "list"])?)
            .await?;
        Ok(list.categories)
    }
}
