use crate::contract::model::{User, UserData};

/// Port for the domain layer: storage operations the service needs.
///
/// Every method is one atomic step; implementations must not let two calls
/// interleave their mutations.
pub trait UsersRepository: Send + Sync {
    /// All users in insertion order.
    fn list(&self) -> Vec<User>;
    /// Load a user by id.
    fn find_by_id(&self, id: &str) -> Option<User>;
    /// Append a fully-formed user.
    fn insert(&self, user: User);
    /// Replace every mutable field of `id`, keeping its position.
    /// Returns the updated user, or `None` if absent.
    fn replace(&self, id: &str, data: UserData) -> Option<User>;
    /// Delete by id. Returns true if a user was removed.
    fn delete(&self, id: &str) -> bool;
}
