use parking_lot::RwLock;

use crate::contract::model::{User, UserData};
use crate::domain::repo::UsersRepository;

/// Process-local, insertion-ordered user store.
///
/// Each operation takes the lock once and never yields while holding it.
#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsersRepository for InMemoryUsersRepository {
    fn list(&self) -> Vec<User> {
        self.users.read().clone()
    }

    fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().iter().find(|u| u.id == id).cloned()
    }

    fn insert(&self, user: User) {
        self.users.write().push(user);
    }

    fn replace(&self, id: &str, data: UserData) -> Option<User> {
        let mut users = self.users.write();
        let slot = users.iter_mut().find(|u| u.id == id)?;
        *slot = User::from_data(slot.id.clone(), data);
        Some(slot.clone())
    }

    fn delete(&self, id: &str) -> bool {
        let mut users = self.users.write();
        match users.iter().position(|u| u.id == id) {
            Some(idx) => {
                users.remove(idx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: id.to_uppercase(),
            age: 1.5,
            email: format!("{id}@example.com"),
        }
    }

    #[test]
    fn preserves_insertion_order_across_mutations() {
        let repo = InMemoryUsersRepository::new();
        for id in ["a", "b", "c"] {
            repo.insert(user(id));
        }

        assert!(repo.delete("b"));
        assert!(!repo.delete("b"));

        let replaced = repo
            .replace(
                "a",
                UserData {
                    name: "Z".into(),
                    age: 2.0,
                    email: "z@example.com".into(),
                },
            )
            .unwrap();
        assert_eq!(replaced.id, "a");

        let ids: Vec<_> = repo.list().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(repo.find_by_id("a").unwrap().name, "Z");
        assert!(repo.find_by_id("b").is_none());
    }
}
