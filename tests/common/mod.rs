use gridcrate::GridRequest;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, Set,
};

pub mod product {
    use sea_orm::entity::prelude::*;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub name: String,
        pub stock: i32,
        pub score: f64,
        pub price: Decimal,
        pub active: Option<bool>,
        pub released: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// In-memory SQLite database seeded with a small, fixed product set.
pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let db = Database::connect("sqlite::memory:").await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(product::Entity)))
        .await?;

    seed(&db).await?;
    Ok(db)
}

async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm::entity::prelude::Decimal;

    let rows = [
        (1, "Alpha Widget", 5, 4.5, Decimal::new(1990, 2), Some(true), "2023-05-01"),
        (2, "Beta Widget", 12, 3.2, Decimal::new(500, 2), Some(false), "2023-06-15"),
        (3, "Gamma Gadget", 5, 4.5, Decimal::new(1990, 2), None, "2024-01-01"),
        (4, "delta gadget", 40, 1.0, Decimal::new(10000, 2), Some(true), "2022-12-31"),
        (5, "Epsilon Tool", 7, 2.5, Decimal::new(4200, 2), Some(true), "2023-05-01"),
    ];

    for (id, name, stock, score, price, active, released) in rows {
        product::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            stock: Set(stock),
            score: Set(score),
            price: Set(price),
            active: Set(active),
            released: Set(released.to_string()),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// The column typing payload a client would post alongside the request.
pub fn data_columns() -> String {
    serde_json::json!([
        {"field": "name", "columnType": "text"},
        {"field": "stock", "columnType": "integer"},
        {"field": "released", "columnType": "date"},
        {"field": "active", "columnType": "boolean"},
        {"field": "price", "columnType": "price"},
        {"field": "score", "columnType": "double"}
    ])
    .to_string()
}

/// A request declaring every seeded column searchable, with no search
/// terms, no ordering and default paging. Tests adjust the fields they
/// exercise.
pub fn base_request() -> GridRequest {
    serde_json::from_value(serde_json::json!({
        "columns": [
            {"data": "name", "searchable": "true", "search": {"value": ""}},
            {"data": "stock", "searchable": "true", "search": {"value": ""}},
            {"data": "released", "searchable": "true", "search": {"value": ""}},
            {"data": "active", "searchable": "true", "search": {"value": ""}},
            {"data": "price", "searchable": "true", "search": {"value": ""}},
            {"data": "score", "searchable": "true", "search": {"value": ""}}
        ],
        "search": {"value": ""},
        "order": [],
        "start": 0,
        "length": 0,
        "draw": 1,
        "dataColumns": data_columns()
    }))
    .expect("request fixture decodes")
}
