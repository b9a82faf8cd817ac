//! Tests for shard operations.

#[cfg(test)]
mod tests {
    use super::super::shard::Shard;

    #[test]
    fn test_set_new_key_increments_len() {
        let shard: Shard<u64, String> = Shard::new();

        assert_eq!(shard.set(1, "one".to_string()), 1, "New key should report len delta 1");
        assert_eq!(shard.set(2, "two".to_string()), 1);
        assert_eq!(shard.len(), 2);
    }

    #[test]
    fn test_overwrite_keeps_len() {
        let shard: Shard<u64, String> = Shard::new();
        shard.set(1, "old".to_string());

        assert_eq!(shard.set(1, "new".to_string()), 0, "Overwrite should not change len");
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.get(&1).as_deref(), Some("new"));
    }

    #[test]
    fn test_set_if_absent_keeps_existing_value() {
        let shard: Shard<u64, String> = Shard::new();

        assert!(shard.set_if_absent(1, "first".to_string()));
        assert!(!shard.set_if_absent(1, "second".to_string()), "Present key must not be replaced");
        assert_eq!(shard.get(&1).as_deref(), Some("first"));
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_get_absent_key() {
        let shard: Shard<u64, String> = Shard::new();

        assert!(shard.get(&42).is_none());
        assert!(!shard.contains(&42));
    }
}
