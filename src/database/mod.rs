pub mod convert;
pub mod memory;
pub mod mongo;
pub mod record;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use record::{CartEntry, FoodItem, FoodUpdate, Price, RecordError};
pub use store::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, FindQuery, InsertOneResult,
    Projection, StoreError, StoreResult, UpdateResult,
};
