use nix::unistd::{Uid, User};

/// Returns the name of the user owning this process.
///
/// Falls back to `$USER`, then to the numeric uid when the passwd entry is unavailable.
pub fn get_username() -> String {
    let uid = Uid::current();
    match User::from_uid(uid) {
        Ok(Some(user)) => user.name,
        _ => std::env::var("USER").unwrap_or_else(|_| uid.to_string()),
    }
}

pub fn is_root() -> bool {
    Uid::effective().is_root()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_username_not_empty() {
        assert!(!get_username().is_empty());
    }
}
