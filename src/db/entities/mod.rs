//! SeaORM entities mapped to the ranking database tables.

pub mod record;

pub mod prelude {
    pub use super::record::ActiveModel as RecordActiveModel;
    pub use super::record::Column as RecordColumn;
    pub use super::record::Entity as Record;
    pub use super::record::Model as RecordModel;
}
