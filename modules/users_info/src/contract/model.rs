/// Pure user model for inter-module communication (no serde/utoipa)
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Server-generated UUID v4, immutable once assigned.
    pub id: String,
    pub name: String,
    pub age: f64,
    pub email: String,
}

/// Mutable fields of a user; create takes them all and update replaces them all.
#[derive(Debug, Clone, PartialEq)]
pub struct UserData {
    pub name: String,
    pub age: f64,
    pub email: String,
}

impl User {
    pub fn from_data(id: String, data: UserData) -> Self {
        Self {
            id,
            name: data.name,
            age: data.age,
            email: data.email,
        }
    }
}
