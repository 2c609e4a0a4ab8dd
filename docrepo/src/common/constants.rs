/// Key under which every stored document keeps its identifier.
pub const DOC_ID: &str = "_id";

/// Field name used to find an identifier when no field carries the marking.
pub const CONVENTIONAL_ID_FIELD: &str = "id";

/// Separator for addressing embedded document fields, as in `engine.serial`.
pub const FIELD_SEPARATOR: &str = ".";

/// Scheme of connection strings served by the in-memory backend.
pub const MEMORY_SCHEME: &str = "memory";

/// Schemes of connection strings served by the MongoDB backend.
pub const MONGODB_SCHEMES: [&str; 2] = ["mongodb", "mongodb+srv"];
