use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use super::product_store::StoreError;

pub async fn ensure_indexes(db: &Database, table_name: &str) -> Result<(), StoreError> {
    // products: one record per URL
    let col = db.collection::<mongodb::bson::Document>(table_name);
    let model = IndexModel::builder()
        .keys(doc! { "productUrl": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    col.create_index(model, None).await?;

    Ok(())
}
